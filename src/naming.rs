use crate::error::{Error, Result};

/// Elements of a CGLS product name:
/// `<project>_<product>[-<sub>][-<timeIndex>]_<date>_<roi>_<sensor>_<version>.nc`
///
/// e.g. `c_gls_NDVI300_202404010000_AFRI_OLCI_V2.0.1.nc` or
/// `c_gls_FAPAR300-RT0_202404100000_GLOBE_OLCI_V1.1.2.nc`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductName {
    pub project: String,
    pub product: String,
    pub sub_product: Option<String>,
    pub time_index: Option<String>,
    pub product_date: String,
    pub roi: String,
    pub sensor: String,
    pub version: String,
}

impl ProductName {
    /// Splits a NetCDF product file name. With `has_time_index` the last `-`
    /// component of the product tag is the time index (RT0, SE1, ...).
    pub fn parse(file_name: &str, has_time_index: bool) -> Result<Self> {
        let incompatible = |reason: String| Error::ProductName {
            name: file_name.to_string(),
            reason,
        };

        let stem = match file_name.rsplit_once('.') {
            Some((stem, _)) => stem,
            None => file_name,
        };

        let parts: Vec<&str> = stem.split('_').collect();
        if parts.len() < 7 {
            return Err(incompatible(format!(
                "expected 7 '_' separated elements, found {}",
                parts.len()
            )));
        }

        let product_parts: Vec<&str> = parts[2].split('-').collect();
        let (sub_product, time_index) = match (product_parts.as_slice(), has_time_index) {
            ([_], false) => (None, None),
            ([_, sub], false) => (Some(sub.to_string()), None),
            ([_, time_index], true) => (None, Some(time_index.to_string())),
            ([_, sub, time_index], true) => (Some(sub.to_string()), Some(time_index.to_string())),
            _ => {
                return Err(incompatible(format!(
                    "product {} does not match time index setting ({})",
                    parts[2], has_time_index
                )));
            }
        };

        Ok(ProductName {
            project: parts[0..2].join("_"),
            product: product_parts[0].to_string(),
            sub_product,
            time_index,
            product_date: parts[3].to_string(),
            roi: parts[4].to_string(),
            sensor: parts[5].to_string(),
            version: parts[6].to_string(),
        })
    }

    /// COG file name for one band. The band name follows the product (and
    /// sub-product); the time index, if any, stays the last product component.
    pub fn cog_file_name(&self, parameter: &str) -> String {
        let mut product_tag = match &self.sub_product {
            Some(sub) => format!("{}-{}-{}", self.product, sub, parameter),
            None => format!("{}-{}", self.product, parameter),
        };
        if let Some(time_index) = &self.time_index {
            product_tag = format!("{}-{}", product_tag, time_index);
        }

        format!(
            "{}_{}_{}_{}_{}_{}.tiff",
            self.project, product_tag, self.product_date, self.roi, self.sensor, self.version
        )
    }
}
