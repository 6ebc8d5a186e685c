mod attributes;
mod bands;
mod cli;
mod cog;
mod config;
mod error;
mod logging;
mod naming;
mod processor;
mod readers;
mod utils;

use std::process::ExitCode;

use chrono::{Local, TimeDelta};
use clap::Parser;
use tracing::{debug, error, info};

use cli::Args;
use config::Config;
use processor::CogProcessor;

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match Config::from_file(&args.cfg_file, &args.overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration {}: {}", args.cfg_file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(args.console_level(), config.log_file()) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    if let Some(log_file) = config.log_file() {
        info!("Logfile: {}", log_file.display());
    }
    match serde_json::to_string(&config) {
        Ok(json) => debug!("{}", json),
        Err(e) => debug!("Cannot serialize configuration: {}", e),
    }

    let in_name = config
        .in_file()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!("Processing {}", in_name);

    let start = Local::now();
    match CogProcessor::new(&config).process() {
        Ok(_) => {
            info!("Ended processing in {}", format_elapsed(Local::now() - start));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Processing {} failed: {}", in_name, e);
            ExitCode::FAILURE
        }
    }
}

/// `HH:MM:SS`, hours are not wrapped at 24.
fn format_elapsed(elapsed: TimeDelta) -> String {
    let seconds = elapsed.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", seconds / 3600, seconds / 60 % 60, seconds % 60)
}
