mod config;
mod error;

pub use config::{
    APP_NAME, ApiSettings, AppConfig, AppConfigExt, ChartMode, ChartSettings, Color,
    DEFAULT_API_URL, DEFAULT_TOKEN_URL, DEFAULT_ZONE_ID, MarkerShape, MilestoneStyle,
    default_abilities_path, default_cache_path, palette,
};
pub use error::ConfigError;
