use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::attributes::{convert_band_attributes, convert_file_attributes};
use crate::bands::resolve_bands;
use crate::cog::CogWriter;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::naming::ProductName;
use crate::readers::{AttributeSource, NcReader};
use crate::utils::ensure_dir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BandOutcome {
    Written(PathBuf),
    /// The output existed and `overwriteExistingFiles` is off
    Skipped(PathBuf),
}

/// Converts the bands of one NetCDF product into COG files.
#[derive(Debug)]
pub struct CogProcessor<'a> {
    config: &'a Config,
    process_date: NaiveDate,
}

impl<'a> CogProcessor<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            process_date: Local::now().date_naive(),
        }
    }

    #[cfg(test)]
    pub fn with_process_date(mut self, process_date: NaiveDate) -> Self {
        self.process_date = process_date;
        self
    }

    pub fn process(&self) -> Result<Vec<BandOutcome>> {
        let config = self.config;
        debug!("COG Processing kernel");

        verify_folder("output folder", config.out_folder())?;
        verify_folder("temporary working folder", config.tmp_folder())?;

        debug!(" > Extracting attributes from input file {}", config.in_file().display());
        let (global_attributes, bands) = {
            let reader = NcReader::open(config.in_file())?;
            let global_attributes = reader.global_attributes()?;
            let bands = resolve_bands(&reader, config.band_info_list())?;
            (global_attributes, bands)
        };

        let in_name = config
            .in_file()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let product = ProductName::parse(&in_name, config.has_time_index())?;

        let writer = CogWriter::new(config);
        let rule = config.attribute_conversion();
        let mut outcomes = Vec::with_capacity(bands.len());

        debug!(" > Creating {} COG file(s)", bands.len());
        for (index, band) in bands.iter().enumerate() {
            let cog_file = product.cog_file_name(band.out_band());
            let cog_path = config.out_folder().join(&cog_file);
            debug!("   > {:>2}/{}: {} -> {}", index + 1, bands.len(), band.in_band(), cog_file);

            if !config.overwrite_existing_files() && cog_path.is_file() {
                warn!("Skipped {}: file already exists", cog_path.display());
                outcomes.push(BandOutcome::Skipped(cog_path));
                continue;
            }

            debug!("     > Converting attributes to metadata");
            let file_metadata =
                convert_file_attributes(&global_attributes, rule, &cog_file, self.process_date);
            let band_metadata = convert_band_attributes(&band.attributes, rule);
            for skipped in file_metadata.skipped.iter().chain(&band_metadata.skipped) {
                warn!("{}", skipped);
            }
            for warning in file_metadata.warnings.iter().chain(&band_metadata.warnings) {
                warn!("{}", warning);
            }

            writer.write(band, &file_metadata.metadata, &band_metadata.metadata, &cog_path)?;
            info!("Created {}", cog_path.display());
            outcomes.push(BandOutcome::Written(cog_path));
        }

        Ok(outcomes)
    }
}

fn verify_folder(label: &str, folder: &Path) -> Result<()> {
    debug!(" > Verifying {} {}", label, folder.display());
    match ensure_dir(folder).map_err(Error::io(folder))? {
        true => debug!("   > Created"),
        false => debug!("   > Existing"),
    }
    Ok(())
}
