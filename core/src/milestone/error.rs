//! Error types for milestone definition loading

use std::path::PathBuf;
use thiserror::Error;

use crate::context::ConfigError;

#[derive(Debug, Error)]
pub enum MilestoneError {
    #[error("failed to read {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML in {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid milestone definitions in {path}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}

impl MilestoneError {
    /// The configuration error behind an invalid definition set, if any.
    pub fn as_config_error(&self) -> Option<&ConfigError> {
        match self {
            MilestoneError::Invalid { source, .. } => Some(source),
            _ => None,
        }
    }
}
