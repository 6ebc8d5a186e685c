use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use std::fs;
use std::path::{Path, PathBuf};

pub mod attribute_conversion;
pub use attribute_conversion::AttributeConversion;

pub mod band;
pub use band::BandSpec;

pub mod error;
pub use error::ConfigError;

/// Values given on the command line. They take precedence over the ones in the
/// configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub in_file: Option<PathBuf>,
    pub out_folder: Option<PathBuf>,
    pub tmp_folder: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    log_file: Option<PathBuf>,
    tmp_folder: PathBuf,
    out_folder: PathBuf,
    in_file: PathBuf,
    has_time_index: bool,
    overwrite_existing_files: bool,
    compression_method: String,
    cog_overviews: Vec<i32>,
    block_size: u32,
    attribute_conversion: AttributeConversion,
    band_info_list: Vec<BandSpec>,
}

// Deserializes a Config from a JSON object, reporting the offending key when a
// required entry is missing or cannot be converted.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        Config::from_object(object, &Overrides::default()).map_err(D::Error::custom)
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        overrides: &Overrides,
    ) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Config::from_json_str(&json, overrides)
    }

    pub fn from_json_str(json: &str, overrides: &Overrides) -> Result<Config, ConfigError> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(object) => Config::from_object(object, overrides),
            _ => Err(ConfigError::NotAnObject),
        }
    }

    fn from_object(
        mut object: Map<String, Value>,
        overrides: &Overrides,
    ) -> Result<Config, ConfigError> {
        let log_file = match overrides.log_file.clone() {
            Some(log_file) => Some(log_file),
            None => log_file_setting(object.remove("logFile"))?,
        };
        let tmp_folder = overridable(&mut object, "tmpFolder", &overrides.tmp_folder)?;
        let out_folder = overridable(&mut object, "outFolder", &overrides.out_folder)?;
        let in_file = overridable(&mut object, "inFile", &overrides.in_file)?;

        let has_time_index: bool = required(&mut object, "hasTimeIndex")?;
        let overwrite_existing_files: bool = required(&mut object, "overwriteExistingFiles")?;
        let compression_method: String = required(&mut object, "compressionMethod")?;
        // GDAL takes overview levels as C ints
        let cog_overviews: Vec<i32> =
            optional(&mut object, "cogOverviews")?.unwrap_or_default();
        let block_size: u32 = required(&mut object, "blockSize")?;
        let attribute_conversion: AttributeConversion =
            required(&mut object, "attributeConversion")?;
        let band_info_list: Vec<BandSpec> = required(&mut object, "bandInfoList")?;

        if compression_method.trim().is_empty() {
            return Err(ConfigError::invalid("compressionMethod", "cannot be empty"));
        }

        // GeoTIFF tiles must be a multiple of 16 pixels
        if block_size == 0 || block_size % 16 != 0 {
            return Err(ConfigError::invalid(
                "blockSize",
                format!("{} is not a positive multiple of 16", block_size),
            ));
        }

        if let Some(level) = cog_overviews.iter().find(|&&level| level < 2) {
            return Err(ConfigError::invalid(
                "cogOverviews",
                format!("overview level {} should be 2 or more", level),
            ));
        }

        attribute_conversion
            .validate()
            .map_err(|reason| ConfigError::invalid("attributeConversion", reason))?;

        if band_info_list.is_empty() {
            return Err(ConfigError::invalid("bandInfoList", "at least one band is required"));
        }
        if band_info_list.iter().any(|band| band.in_band.is_empty()) {
            return Err(ConfigError::invalid("bandInfoList", "inBand cannot be empty"));
        }

        Ok(Config {
            log_file,
            tmp_folder,
            out_folder,
            in_file,
            has_time_index,
            overwrite_existing_files,
            compression_method,
            cog_overviews,
            block_size,
            attribute_conversion,
            band_info_list,
        })
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    pub fn tmp_folder(&self) -> &Path {
        &self.tmp_folder
    }

    pub fn out_folder(&self) -> &Path {
        &self.out_folder
    }

    pub fn in_file(&self) -> &Path {
        &self.in_file
    }

    pub fn has_time_index(&self) -> bool {
        self.has_time_index
    }

    pub fn overwrite_existing_files(&self) -> bool {
        self.overwrite_existing_files
    }

    pub fn compression_method(&self) -> &str {
        &self.compression_method
    }

    pub fn cog_overviews(&self) -> &[i32] {
        &self.cog_overviews
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn attribute_conversion(&self) -> &AttributeConversion {
        &self.attribute_conversion
    }

    pub fn band_info_list(&self) -> &[BandSpec] {
        &self.band_info_list
    }
}

fn required<T: DeserializeOwned>(
    object: &mut Map<String, Value>,
    key: &'static str,
) -> Result<T, ConfigError> {
    let value = object.remove(key).ok_or(ConfigError::MissingKey(key))?;
    serde_json::from_value(value).map_err(|e| ConfigError::invalid(key, e.to_string()))
}

// Absent and null are treated the same way.
fn optional<T: DeserializeOwned>(
    object: &mut Map<String, Value>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match object.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ConfigError::invalid(key, e.to_string())),
    }
}

fn overridable(
    object: &mut Map<String, Value>,
    key: &'static str,
    cli_value: &Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    let file_value: Option<PathBuf> = optional(object, key)?;
    cli_value
        .clone()
        .or(file_value)
        .ok_or(ConfigError::MissingKey(key))
}

// `logFile` is either a path, or null/false to disable the file log.
fn log_file_setting(value: Option<Value>) -> Result<Option<PathBuf>, ConfigError> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::String(path)) if path.is_empty() => Ok(None),
        Some(Value::String(path)) => Ok(Some(PathBuf::from(path))),
        Some(other) => Err(ConfigError::invalid(
            "logFile",
            format!("expected a path, null or false, got {}", other),
        )),
    }
}
