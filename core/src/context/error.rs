//! Error types for configuration

use std::path::PathBuf;
use thiserror::Error;

/// Errors in the run configuration or the milestone definition set.
///
/// All of these are detected before any fetch or evaluation begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("milestone index {index} is defined twice ('{first}' and '{second}')")]
    DuplicateMilestoneIndex {
        index: u32,
        first: String,
        second: String,
    },

    #[error(
        "victory milestone '{label}' has index {index} \
         but '{deeper_label}' is deeper (index {deeper_index})"
    )]
    VictoryNotDeepest {
        label: String,
        index: u32,
        deeper_label: String,
        deeper_index: u32,
    },

    #[error("missing required configuration: {}", .fields.join(", "))]
    MissingField { fields: Vec<&'static str> },

    #[error("failed to load configuration")]
    Load(#[source] confy::ConfyError),

    #[error("failed to save configuration to {path}")]
    Save {
        path: PathBuf,
        #[source]
        source: confy::ConfyError,
    },

    #[error("failed to locate configuration file")]
    Locate(#[source] confy::ConfyError),
}
