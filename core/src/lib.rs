pub mod attempt;
pub mod cache;
pub mod context;
pub mod fflogs;
pub mod milestone;
pub mod progression;

// Re-exports for convenience
pub use attempt::{Attempt, AttemptEvent, EventKind, sort_chronologically};
pub use cache::{CacheError, JsonFileCache, MemoryCache, ResponseCache};
pub use context::{AppConfig, AppConfigExt, ConfigError};
pub use fflogs::{
    AbilityCatalog, FetchError, FetchOptions, FflogsClient, ReportFetcher, RetryPolicy,
};
pub use milestone::{
    LoadedMilestones, MilestoneDefinition, MilestoneError, MilestoneSet, builtin_milestones,
    load_milestones, load_milestones_from_file, parse_milestones,
};
pub use progression::{ProgressionSummary, ResolvedAttempt, evaluate, resolve};
