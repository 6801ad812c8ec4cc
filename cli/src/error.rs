use std::error::Error as _;
use std::fmt::Write as _;
use std::path::PathBuf;

use progchart_core::{CacheError, ConfigError, FetchError, MilestoneError};
use progchart_render::RenderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid configuration")]
    Config(#[from] ConfigError),

    #[error("invalid milestone definitions")]
    Milestones(#[from] MilestoneError),

    #[error("failed to fetch attempts")]
    Fetch(#[from] FetchError),

    #[error("response cache error")]
    Cache(#[from] CacheError),

    #[error("failed to render chart")]
    Render(#[from] RenderError),

    #[error("failed to read attempts from {path}")]
    ReadAttempts {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse attempts in {path}")]
    ParseAttempts {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize configuration")]
    ShowConfig(#[source] toml::ser::Error),
}

impl CliError {
    /// The error and every cause beneath it, one per line.
    pub fn report(&self) -> String {
        let mut out = format!("error: {self}");
        let mut source = self.source();
        while let Some(cause) = source {
            let _ = write!(out, "\n  caused by: {cause}");
            source = cause.source();
        }
        out
    }
}
