//! Progression derivation
//!
//! Turns a chronological list of attempts into the deepest milestone each
//! attempt reached, plus run-level aggregates for reporting.

mod evaluator;
mod summary;

#[cfg(test)]
mod evaluator_tests;

pub use evaluator::*;
pub use summary::*;
