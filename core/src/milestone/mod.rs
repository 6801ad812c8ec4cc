//! Milestone definitions
//!
//! Stateless progress detectors parsed from TOML:
//!
//! - **definition**: the closed `MilestoneDefinition` enum and its `matches` check
//! - **set**: `MilestoneSet`, the validated, index-ordered collection used by the evaluator
//! - **loader**: TOML loading plus the bundled definition sets

mod definition;
mod error;
mod loader;
mod set;

pub use definition::*;
pub use error::MilestoneError;
pub use loader::*;
pub use set::*;
