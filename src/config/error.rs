use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration key `{0}`")]
    MissingKey(&'static str),
    #[error("Invalid value for configuration key `{key}`: {reason}")]
    InvalidKey { key: &'static str, reason: String },
    #[error("Configuration must be a JSON object")]
    NotAnObject,
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidKey {
            key,
            reason: reason.into(),
        }
    }

    /// Name of the configuration key the error is about, if any.
    #[cfg(test)]
    pub fn key(&self) -> Option<&'static str> {
        match self {
            ConfigError::MissingKey(key) | ConfigError::InvalidKey { key, .. } => Some(key),
            _ => None,
        }
    }
}
