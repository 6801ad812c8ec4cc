//! Application configuration
//!
//! This module re-exports the shared config types from progchart-types and
//! provides persistence and validation for AppConfig.

use std::path::{Path, PathBuf};

pub use progchart_types::{
    ApiSettings, AppConfig, ChartMode, ChartSettings, Color, DEFAULT_API_URL, DEFAULT_TOKEN_URL,
    DEFAULT_ZONE_ID, MarkerShape, MilestoneStyle, palette,
};

use super::ConfigError;

pub const APP_NAME: &str = "progchart";
const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// `<cache dir>/progchart/cache.json`, or `cache.json` in the working
/// directory when the platform has no cache directory.
pub fn default_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join(APP_NAME))
        .unwrap_or_default()
        .join("cache.json")
}

/// Ability catalog file kept beside the response cache.
pub fn default_abilities_path(cache_path: &Path) -> PathBuf {
    cache_path.with_file_name("abilities.json")
}

// ─────────────────────────────────────────────────────────────────────────────
// AppConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for AppConfig persistence and validation
pub trait AppConfigExt: Sized {
    /// Load from `path`, or from the platform config location when `None`.
    /// A missing file is created with defaults.
    fn load(path: Option<&Path>) -> Result<Self, ConfigError>;
    fn save(&self, path: Option<&Path>) -> Result<(), ConfigError>;
    fn config_path(path: Option<&Path>) -> Result<PathBuf, ConfigError>;
    /// Fails with [`ConfigError::MissingField`] listing every unset required field.
    fn validate(&self) -> Result<(), ConfigError>;
    fn resolved_cache_path(&self) -> PathBuf;
    /// Copy safe to print: secrets and token replaced by a placeholder.
    fn masked(&self) -> Self;
}

impl AppConfigExt for AppConfig {
    fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config: AppConfig = match path {
            Some(path) => confy::load_path(path),
            None => confy::load(APP_NAME, CONFIG_NAME),
        }
        .map_err(ConfigError::Load)?;

        tracing::debug!(
            path = ?path,
            user_id = ?config.user_id,
            zone_id = ?config.zone_id,
            has_token = config.api.has_token(),
            "Loaded configuration"
        );
        Ok(config)
    }

    fn save(&self, path: Option<&Path>) -> Result<(), ConfigError> {
        let target = Self::config_path(path)?;
        confy::store_path(&target, self).map_err(|source| ConfigError::Save {
            path: target.clone(),
            source,
        })?;
        tracing::debug!(path = %target.display(), "Saved configuration");
        Ok(())
    }

    fn config_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
                .map_err(ConfigError::Locate),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let fields = self.missing_fields();
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingField { fields })
        }
    }

    fn resolved_cache_path(&self) -> PathBuf {
        self.cache_path.clone().unwrap_or_else(default_cache_path)
    }

    fn masked(&self) -> Self {
        let mask = |value: &str| {
            if value.is_empty() {
                String::new()
            } else {
                "********".to_string()
            }
        };

        let mut masked = self.clone();
        masked.api.client_secret = mask(&self.api.client_secret);
        masked.api.token = self.api.token.as_deref().map(mask);
        masked
    }
}
