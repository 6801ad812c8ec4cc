use std::path::{Path, PathBuf};

use progchart_core::context::default_abilities_path;
use progchart_core::{
    AppConfig, AppConfigExt, ConfigError, FflogsClient, LoadedMilestones, MilestoneError,
    load_milestones,
};

use crate::CliError;

/// Configuration for one CLI invocation plus where it came from.
pub struct CliContext {
    pub config: AppConfig,
    /// Explicit `--config` path; the platform location when `None`
    config_path: Option<PathBuf>,
}

impl CliContext {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = AppConfig::load(config_path.as_deref())?;
        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn config_path(&self) -> Result<PathBuf, ConfigError> {
        AppConfig::config_path(self.config_path.as_deref())
    }

    /// Milestones from `path`, the configured file, or the bundled set.
    pub fn milestones(&self, path: Option<&Path>) -> Result<LoadedMilestones, MilestoneError> {
        load_milestones(path.or(self.config.milestones_path.as_deref()))
    }

    pub fn abilities_path(&self) -> PathBuf {
        default_abilities_path(&self.config.resolved_cache_path())
    }

    /// API client with a usable token. A newly issued token is written
    /// back to the config file.
    pub async fn authorized_client(&mut self) -> Result<FflogsClient, CliError> {
        let mut client = FflogsClient::new(self.config.api.clone())?;

        if let Some(token) = client.ensure_token().await? {
            self.config.api.token = Some(token);
            self.config.save(self.config_path.as_deref())?;
            tracing::info!("New token generated and config file updated");
        }

        Ok(client)
    }

    /// Fail before any network access when required settings are missing.
    pub fn require_api_settings(&self) -> Result<u64, ConfigError> {
        self.config.validate()?;
        self.config.user_id.ok_or(ConfigError::MissingField { fields: vec!["user_id"] })
    }
}
