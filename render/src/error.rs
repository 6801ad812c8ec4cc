//! Error types for chart rendering

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The requested font family is not installed or its file could not be
    /// loaded. Recovered by falling back to sans-serif, or to no text when
    /// no faces are installed at all.
    #[error("font '{family}' is unavailable: {reason}")]
    FontUnavailable { family: String, reason: String },

    #[error("invalid canvas size {width}x{height}")]
    CanvasSize { width: u32, height: u32 },

    #[error("failed to encode chart as PNG")]
    EncodePng(#[source] png::EncodingError),

    #[error("failed to encode chart animation as GIF")]
    EncodeGif(#[source] gif::EncodingError),

    #[error("failed to create output directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write chart to {path}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
