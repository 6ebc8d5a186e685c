pub mod nc;
pub mod types;

use std::path::Path;

pub use nc::NcReader;
pub use types::{AttributeMap, AttributeSource, AttributeValue, Number};

/// GDAL subdataset name of one NetCDF variable, e.g. `NETCDF:"in.nc":NDVI`.
pub fn netcdf_subdataset(path: &Path, variable: &str) -> String {
    format!("NETCDF:\"{}\":{}", path.display(), variable)
}
