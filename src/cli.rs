use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use crate::config::Overrides;

/// COG creation from NetCDF input file
#[derive(Parser, Debug)]
#[command(name = "cog-processor", version, long_about = None)]
pub struct Args {
    /// JSON configuration file
    #[arg(short = 'c', long = "cfgFile")]
    pub cfg_file: PathBuf,

    /// Full path to NetCDF input file
    #[arg(short = 'i', long = "inFile")]
    pub in_file: PathBuf,

    /// Full path to output folder in which the COGs will be stored
    #[arg(short = 'o', long = "outFolder")]
    pub out_folder: PathBuf,

    /// Folder for the temporary files created during COG generation, overrules
    /// the configuration file
    #[arg(short = 't', long = "tmpFolder")]
    pub tmp_folder: Option<PathBuf>,

    /// Log file, overrules the configuration file
    #[arg(short = 'l', long = "logFile")]
    pub log_file: Option<PathBuf>,

    /// Suppress output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            in_file: Some(self.in_file.clone()),
            out_folder: Some(self.out_folder.clone()),
            tmp_folder: self.tmp_folder.clone(),
            log_file: self.log_file.clone(),
        }
    }

    pub fn console_level(&self) -> LevelFilter {
        match (self.quiet, self.verbose) {
            (true, _) => LevelFilter::WARN,
            (_, true) => LevelFilter::DEBUG,
            _ => LevelFilter::INFO,
        }
    }
}
