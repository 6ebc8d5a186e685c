use std::path::{Path, PathBuf};

use gdal::cpl::CslStringList;
use gdal::{Dataset, DatasetOptions, DriverManager, GdalOpenFlags, Metadata as GdalMetadata};
use tracing::{debug, warn};

use crate::attributes::Metadata;
use crate::bands::ResolvedBand;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::utils::safe_move;

/// Writes one COG per band through GDAL.
///
/// Intermediate files live in a scratch directory under the temporary folder.
/// It is removed once the COG is in place and kept for inspection when a step fails.
#[derive(Debug)]
pub struct CogWriter<'a> {
    compression: &'a str,
    block_size: u32,
    overviews: Vec<i32>,
    tmp_folder: &'a Path,
}

impl<'a> CogWriter<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            compression: config.compression_method(),
            block_size: config.block_size(),
            overviews: config.cog_overviews().to_vec(),
            tmp_folder: config.tmp_folder(),
        }
    }

    pub fn write(
        &self,
        band: &ResolvedBand,
        metadata: &Metadata,
        band_metadata: &Metadata,
        cog_path: &Path,
    ) -> Result<()> {
        let stem = cog_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| band.out_band().to_string());

        let scratch = tempfile::Builder::new()
            .prefix(&format!("{}.", stem))
            .tempdir_in(self.tmp_folder)
            .map_err(Error::io(self.tmp_folder))?;

        let result = self
            .convert(band, metadata, band_metadata, scratch.path(), &stem)
            .and_then(|tmp_cog| {
                debug!("     > Moving to final location: {}", cog_path.display());
                safe_move(&tmp_cog, cog_path).map_err(Error::io(cog_path))
            });

        match result {
            Ok(()) => {
                debug!("     > Removing temp files from {}", scratch.path().display());
                let scratch_path = scratch.path().to_path_buf();
                scratch.close().map_err(Error::io(&scratch_path))
            }
            Err(e) => {
                let kept = scratch.keep();
                warn!("Temporary files kept for inspection in {}", kept.display());
                Err(e)
            }
        }
    }

    fn convert(
        &self,
        band: &ResolvedBand,
        metadata: &Metadata,
        band_metadata: &Metadata,
        scratch: &Path,
        stem: &str,
    ) -> Result<PathBuf> {
        let base_path = scratch.join(format!("{}_base.tiff", stem));
        debug!("     > Creating GeoTiff base image");
        debug!("     > gdal_translate -of GTIFF {} {}", band.source, base_path.display());
        {
            let source = Dataset::open(&band.source)?;
            let driver = DriverManager::get_driver_by_name("GTiff")?;
            source.create_copy(&driver, &base_path, &CslStringList::new())?;
        }

        let mut dataset = Dataset::open_ex(
            &base_path,
            DatasetOptions {
                open_flags: GdalOpenFlags::GDAL_OF_UPDATE | GdalOpenFlags::GDAL_OF_RASTER,
                ..DatasetOptions::default()
            },
        )?;

        debug!("     > Setting metadata");
        replace_metadata(&mut dataset, &base_path, metadata, band_metadata, band.description())?;

        if !self.overviews.is_empty() {
            debug!("     > Adding overviews");
            debug!(
                "     > gdaladdo --config GDAL_TIFF_OVR_BLOCKSIZE {} --config COMPRESS_OVERVIEW {} -r {} {} {:?}",
                self.block_size,
                self.compression,
                band.resample_method(),
                base_path.display(),
                self.overviews
            );
            let _options = ScopedConfigOptions::set(&[
                ("GDAL_TIFF_OVR_BLOCKSIZE", self.block_size.to_string()),
                ("COMPRESS_OVERVIEW", self.compression.to_string()),
            ])?;
            dataset.build_overviews(band.resample_method(), &self.overviews, &[])?;
        }
        drop(dataset);

        let cog_tmp = scratch.join(format!("{}.tmp.tiff", stem));
        debug!("     > Creating final COG");
        debug!(
            "     > gdal_translate -of COG -co COMPRESS={} -co PREDICTOR=YES -co BLOCKSIZE={} {} {}",
            self.compression,
            self.block_size,
            base_path.display(),
            cog_tmp.display()
        );
        let base = Dataset::open(&base_path)?;
        let driver = DriverManager::get_driver_by_name("COG")?;
        base.create_copy(&driver, &cog_tmp, &self.creation_options()?)?;

        Ok(cog_tmp)
    }

    fn creation_options(&self) -> Result<CslStringList> {
        let overviews = if self.overviews.is_empty() { "NONE" } else { "AUTO" };

        let mut options = CslStringList::new();
        options.set_name_value("COMPRESS", self.compression)?;
        options.set_name_value("PREDICTOR", "YES")?;
        options.set_name_value("BLOCKSIZE", &self.block_size.to_string())?;
        options.set_name_value("OVERVIEWS", overviews)?;
        Ok(options)
    }
}

// The NetCDF driver fills the default domain with `NC_GLOBAL#...` and
// `<var>#...` items; these are replaced, not merged.
fn replace_metadata(
    dataset: &mut Dataset,
    path: &Path,
    metadata: &Metadata,
    band_metadata: &Metadata,
    description: &str,
) -> Result<()> {
    let cleared = |ok: bool| match ok {
        true => Ok(()),
        false => Err(Error::Conversion {
            step: "Clearing metadata",
            path: path.to_path_buf(),
        }),
    };

    cleared(clear_default_domain(unsafe { dataset.c_dataset() }))?;
    for (key, value) in metadata {
        dataset.set_metadata_item(key, value, "")?;
    }

    let mut band = dataset.rasterband(1)?;
    cleared(clear_default_domain(unsafe { band.c_rasterband() }))?;
    for (key, value) in band_metadata {
        band.set_metadata_item(key, value, "")?;
    }
    if !description.is_empty() {
        band.set_description(description)?;
    }

    Ok(())
}

fn clear_default_domain(handle: gdal_sys::GDALMajorObjectH) -> bool {
    let no_items = std::ptr::null_mut::<*mut std::ffi::c_char>();
    let rv = unsafe { gdal_sys::GDALSetMetadata(handle, no_items as _, c"".as_ptr()) };
    rv == gdal_sys::CPLErr::CE_None
}

/// GDAL configuration options that are cleared again when dropped.
struct ScopedConfigOptions {
    keys: Vec<&'static str>,
}

impl ScopedConfigOptions {
    fn set(options: &[(&'static str, String)]) -> Result<Self> {
        let mut scoped = ScopedConfigOptions {
            keys: Vec::with_capacity(options.len()),
        };
        for (key, value) in options {
            gdal::config::set_config_option(key, value)?;
            scoped.keys.push(*key);
        }
        Ok(scoped)
    }
}

impl Drop for ScopedConfigOptions {
    fn drop(&mut self) {
        for key in &self.keys {
            if let Err(e) = gdal::config::clear_config_option(key) {
                warn!("Could not clear GDAL option {}: {}", key, e);
            }
        }
    }
}
