//! Logging configuration with file-based output and size-based rotation.
//!
//! Writes logs to `~/.config/progchart/progchart.log` (or platform
//! equivalent) with 10 MB size-based rotation. Set `DEBUG_LOGGING=1` to
//! enable debug output for progchart crates.

use std::path::PathBuf;

use progchart_core::context::APP_NAME;
use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Initialize logging with dual output (file + stderr).
///
/// Returns a `WorkerGuard` that must be held until exit so buffered
/// lines are flushed. Console output goes to stderr, keeping stdout for
/// command results.
///
/// If the log directory cannot be created, returns `None` and logs to
/// stderr only.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let Some(log_dir) = log_dir() else {
        init_console_only(debug_logging);
        return None;
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // Subscriber not installed yet
        eprintln!(
            "Failed to create log directory {}: {e}, logging to console only",
            log_dir.display()
        );
        init_console_only(debug_logging);
        return None;
    }

    // Keep only progchart.log and progchart.log.1
    let log_path = log_dir.join("progchart.log");
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(MAX_LOG_SIZE),
        1,
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {}: {e}", log_path.display());
            init_console_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(EnvFilter::new(filter_directive(debug_logging)))
        .init();

    tracing::debug!(log_file = %log_path.display(), debug_logging, "Logging initialized");

    Some(guard)
}

fn init_console_only(debug_logging: bool) {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(EnvFilter::new(filter_directive(debug_logging)))
        .init();

    tracing::debug!(debug_logging, "Logging initialized (console only)");
}

fn log_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME))
}

fn filter_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        "info,progchart_cli=debug,progchart_core=debug,progchart_render=debug"
    } else {
        "info"
    }
}
