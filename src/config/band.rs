use serde::{Deserialize, Serialize};

/// One entry of `bandInfoList`: a NetCDF variable to convert into a COG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandSpec {
    pub in_band: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_band: Option<String>,
    #[serde(default)]
    pub description: String,
    pub resample_method: String,
}

impl BandSpec {
    #[cfg(test)]
    pub fn new(in_band: &str, resample_method: &str) -> Self {
        Self {
            in_band: in_band.to_string(),
            out_band: None,
            description: String::new(),
            resample_method: resample_method.to_string(),
        }
    }

    /// Band name used in the output file name. Falls back to `inBand` when
    /// `outBand` is omitted, null or empty.
    pub fn resolved_out_band(&self) -> &str {
        match self.out_band.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.in_band,
        }
    }
}
