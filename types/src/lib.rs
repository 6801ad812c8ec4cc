//! Shared configuration types for progchart
//!
//! This crate contains the serializable types shared between the
//! progression engine (progchart-core), the chart renderer
//! (progchart-render) and the command line frontend.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Color Type
// ─────────────────────────────────────────────────────────────────────────────

/// RGBA color as [r, g, b, a] bytes
pub type Color = [u8; 4];

/// Marker colors the renderer falls back to.
pub mod palette {
    use super::Color;

    /// Marker color for attempts that reached no milestone
    pub const UNRESOLVED: Color = [128, 128, 128, 255];
    /// Matplotlib's default series blue, used when a style omits its color
    pub const DEFAULT_MARKER: Color = [31, 119, 180, 255];
}

// ─────────────────────────────────────────────────────────────────────────────
// Milestone Styling
// ─────────────────────────────────────────────────────────────────────────────

/// Marker drawn for each attempt on the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    Circle,
    #[default]
    Diamond,
    Square,
    Triangle,
    Star,
    Octagon,
}

/// Display style of a milestone (color, marker, edge).
///
/// Every field is optional in TOML; omitted fields fall back to the
/// default diamond marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneStyle {
    #[serde(default = "default_marker_color")]
    pub color: Color,

    #[serde(default)]
    pub marker: MarkerShape,

    /// Marker size in points (radius-ish; scaled by the renderer)
    #[serde(default = "default_marker_size")]
    pub marker_size: f32,

    /// Marker outline color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_color: Option<Color>,

    /// Fill opacity (0.0 - 1.0)
    #[serde(default = "default_marker_alpha")]
    pub alpha: f32,
}

impl Default for MilestoneStyle {
    fn default() -> Self {
        Self {
            color: default_marker_color(),
            marker: MarkerShape::default(),
            marker_size: default_marker_size(),
            edge_color: None,
            alpha: default_marker_alpha(),
        }
    }
}

impl MilestoneStyle {
    pub fn with_color(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn marker(mut self, marker: MarkerShape, marker_size: f32) -> Self {
        self.marker = marker;
        self.marker_size = marker_size;
        self
    }
}

fn default_marker_color() -> Color {
    palette::DEFAULT_MARKER
}

fn default_marker_size() -> f32 {
    4.0
}

fn default_marker_alpha() -> f32 {
    0.8
}

// ─────────────────────────────────────────────────────────────────────────────
// Chart Settings
// ─────────────────────────────────────────────────────────────────────────────

/// What the vertical axis of the chart represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartMode {
    /// Milestone depth (one row per milestone, "none" at the bottom)
    #[default]
    Depth,
    /// Pull length in seconds, markers colored by milestone
    Duration,
}

impl std::str::FromStr for ChartMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "depth" => Ok(ChartMode::Depth),
            "duration" => Ok(ChartMode::Duration),
            other => Err(format!(
                "unknown chart mode '{other}' (expected depth or duration)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSettings {
    #[serde(default)]
    pub mode: ChartMode,

    #[serde(default = "default_chart_width")]
    pub width: u32,

    #[serde(default = "default_chart_height")]
    pub height: u32,

    /// Preferred font family; falls back to sans-serif when not installed
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Optional font file loaded into the font database before rendering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,

    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Write an animated GIF with one frame per pull instead of a PNG
    #[serde(default)]
    pub animate: bool,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            mode: ChartMode::default(),
            width: default_chart_width(),
            height: default_chart_height(),
            font_family: default_font_family(),
            font_path: None,
            output_path: default_output_path(),
            animate: false,
        }
    }
}

fn default_chart_width() -> u32 {
    1000
}

fn default_chart_height() -> u32 {
    500
}

fn default_font_family() -> String {
    "Liberation Serif".to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("output/output.png")
}

// ─────────────────────────────────────────────────────────────────────────────
// API Settings
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_API_URL: &str = "https://www.fflogs.com/api/v2/client";
pub const DEFAULT_TOKEN_URL: &str = "https://www.fflogs.com/oauth/token";

/// Credentials and endpoints for the combat-log API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    /// Bearer token; requested with the client credentials when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token: None,
            api_url: default_api_url(),
            token_url: default_token_url(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiSettings {
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    60
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Config
// ─────────────────────────────────────────────────────────────────────────────

/// The Epic of Alexander (Ultimate)
pub const DEFAULT_ZONE_ID: u32 = 887;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiSettings,

    /// Numeric user id on the log site whose reports are analysed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,

    /// Zone to fetch; the milestone file's zone, then the default zone, when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<u32>,

    /// Restrict attempts to a single encounter within the zone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encounter_id: Option<u32>,

    /// Milestone definition file; the bundled set is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestones_path: Option<PathBuf>,

    /// Response cache file; defaults to the platform cache directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<PathBuf>,

    #[serde(default)]
    pub chart: ChartSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            user_id: None,
            zone_id: None,
            encounter_id: None,
            milestones_path: None,
            cache_path: None,
            chart: ChartSettings::default(),
        }
    }
}

impl AppConfig {
    /// Names of required fields that are not set.
    ///
    /// Client credentials are only required while no token is stored.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.user_id.is_none() {
            missing.push("user_id");
        }
        if !self.api.has_token() {
            if self.api.client_id.is_empty() {
                missing.push("api.client_id");
            }
            if self.api.client_secret.is_empty() {
                missing.push("api.client_secret");
            }
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.zone_id, None);
        assert_eq!(config.chart.font_family, "Liberation Serif");
        assert_eq!(config.api.max_retries, 3);
    }

    #[test]
    fn missing_fields_requires_credentials_without_token() {
        let config = AppConfig::default();
        assert_eq!(
            config.missing_fields(),
            vec!["user_id", "api.client_id", "api.client_secret"]
        );

        let mut with_token = AppConfig {
            user_id: Some(42),
            ..Default::default()
        };
        with_token.api.token = Some("abc".to_string());
        assert!(with_token.missing_fields().is_empty());
    }

    #[test]
    fn empty_token_counts_as_missing() {
        let mut config = AppConfig {
            user_id: Some(1),
            ..Default::default()
        };
        config.api.token = Some(String::new());
        assert!(config.missing_fields().contains(&"api.client_id"));
    }

    #[test]
    fn style_fields_default_individually() {
        let style: MilestoneStyle =
            toml::from_str("color = [255, 215, 0, 255]\nmarker = \"star\"").unwrap();
        assert_eq!(style.color, [255, 215, 0, 255]);
        assert_eq!(style.marker, MarkerShape::Star);
        assert_eq!(style.marker_size, 4.0);
        assert_eq!(style.edge_color, None);
    }

    #[test]
    fn chart_mode_parses_case_insensitively() {
        assert_eq!("Duration".parse::<ChartMode>(), Ok(ChartMode::Duration));
        assert_eq!("depth".parse::<ChartMode>(), Ok(ChartMode::Depth));
        assert!("bars".parse::<ChartMode>().is_err());
    }
}
