//! Progchart Render Library
//!
//! Draws the progression chart on the CPU, either as a PNG file or as an
//! animated GIF that adds one pull per frame.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │               chart          │      animation       │
//! │ ChartRenderer, RenderOutcome │   GIF frame encoder  │
//! ├─────────────────────────────────────────────────────┤
//! │          stats            │         layout          │
//! │   legend + info panel     │   plot area, scales     │
//! ├─────────────────────────────────────────────────────┤
//! │          markers          │          text           │
//! │   tiny-skia marker paths  │  cosmic-text + fontdb   │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod animation;
pub mod chart;
pub mod colors;
mod error;
pub mod layout;
pub mod markers;
pub mod stats;
pub mod text;

#[cfg(test)]
mod animation_tests;

// Re-export commonly used types
pub use animation::{FINAL_FRAME_HOLD_CS, FRAME_DELAY_CS};
pub use chart::{ChartInput, ChartRenderer, RenderOutcome};
pub use error::RenderError;
pub use stats::{ChartStats, format_hms, format_mmss};
pub use text::{ResolvedFont, TextRenderer};
