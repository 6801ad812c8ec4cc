pub mod commands;
pub mod context;
mod error;
pub mod logging;

pub use context::CliContext;
pub use error::CliError;
