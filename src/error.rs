use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ConfigError;

/// Fatal errors. Any of these aborts the processing of the input file.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Cannot read NetCDF input file {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: netcdf::Error,
    },

    #[error("{band} not found in {path}: {available:?}")]
    BandNotFound {
        band: String,
        path: PathBuf,
        available: Vec<String>,
    },

    #[error("Incompatible product name {name}: {reason}")]
    ProductName { name: String, reason: String },

    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("{step} failed for {path}")]
    Conversion { step: &'static str, path: PathBuf },

    #[error("Cannot install logger: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Adapter for `map_err` on filesystem calls.
    pub fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
        move |source| Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
