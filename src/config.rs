//! Runtime configuration for an editing session.
//!
//! Values load from a JSON file with per-field defaults, then a few
//! environment variables override the service endpoints and scrub behavior.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use crate::constants::{
    DEFAULT_FPS, DEFAULT_PROJECT_MIN_DURATION_SECONDS, DEFAULT_RESOLUTION_HEIGHT,
    DEFAULT_RESOLUTION_WIDTH, STATUS_BACKOFF_INITIAL_MS, STATUS_BACKOFF_MAX_MS,
    TRANSPORT_DEFAULT_UNMUTE_VOLUME, TRANSPORT_DRIFT_TOLERANCE_SECONDS,
};
use crate::error::Result;
use crate::utils::parse_bool_input;

pub const ENV_API_URL: &str = "VIDEO_EDITOR_API_URL";
pub const ENV_STATUS_URL: &str = "VIDEO_EDITOR_STATUS_URL";
pub const ENV_ACCESS_TOKEN: &str = "VIDEO_EDITOR_TOKEN";
pub const ENV_PAUSE_ON_SCRUB: &str = "VIDEO_EDITOR_PAUSE_ON_SCRUB";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub project: ProjectDefaults,
    #[serde(default)]
    pub services: ServiceConfig,
}

/// Transport behavior switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Whether drag-to-seek pauses playback. Programmatic seeks never pause.
    #[serde(default = "default_true")]
    pub pause_on_scrub: bool,
    #[serde(default = "default_drift_tolerance")]
    pub drift_tolerance_seconds: f64,
    /// Volume restored when unmuting from zero.
    #[serde(default = "default_unmute_volume")]
    pub default_unmute_volume: f64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            pause_on_scrub: true,
            drift_tolerance_seconds: default_drift_tolerance(),
            default_unmute_volume: default_unmute_volume(),
        }
    }
}

/// Settings applied to newly created projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDefaults {
    #[serde(default = "default_min_duration")]
    pub min_duration_seconds: f64,
    #[serde(default = "default_fps")]
    pub fps: f64,
    #[serde(default = "default_width")]
    pub resolution_width: u32,
    #[serde(default = "default_height")]
    pub resolution_height: u32,
}

impl Default for ProjectDefaults {
    fn default() -> Self {
        Self {
            min_duration_seconds: default_min_duration(),
            fps: default_fps(),
            resolution_width: default_width(),
            resolution_height: default_height(),
        }
    }
}

/// Endpoints for the external collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_status_url")]
    pub status_url: String,
    /// Bearer token issued by the (external) auth flow.
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_backoff_initial")]
    pub backoff_initial_ms: u64,
    #[serde(default = "default_backoff_max")]
    pub backoff_max_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            status_url: default_status_url(),
            access_token: None,
            backoff_initial_ms: default_backoff_initial(),
            backoff_max_ms: default_backoff_max(),
        }
    }
}

impl EditorConfig {
    /// Loads a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file missing, using defaults");
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }

    /// Overrides service settings from the process environment.
    pub fn apply_env(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(url) = non_empty(ENV_API_URL) {
            self.services.api_base_url = url;
        }
        if let Some(url) = non_empty(ENV_STATUS_URL) {
            self.services.status_url = url;
        }
        if let Some(token) = non_empty(ENV_ACCESS_TOKEN) {
            self.services.access_token = Some(token);
        }
        if let Some(flag) = non_empty(ENV_PAUSE_ON_SCRUB) {
            self.transport.pause_on_scrub = parse_bool_input(&flag, self.transport.pause_on_scrub);
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_drift_tolerance() -> f64 {
    TRANSPORT_DRIFT_TOLERANCE_SECONDS
}

fn default_unmute_volume() -> f64 {
    TRANSPORT_DEFAULT_UNMUTE_VOLUME
}

fn default_min_duration() -> f64 {
    DEFAULT_PROJECT_MIN_DURATION_SECONDS
}

fn default_fps() -> f64 {
    DEFAULT_FPS
}

fn default_width() -> u32 {
    DEFAULT_RESOLUTION_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_RESOLUTION_HEIGHT
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_status_url() -> String {
    "ws://localhost:8000/ws".to_string()
}

fn default_backoff_initial() -> u64 {
    STATUS_BACKOFF_INITIAL_MS
}

fn default_backoff_max() -> u64 {
    STATUS_BACKOFF_MAX_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"transport":{"pause_on_scrub":false}}"#).unwrap();
        assert!(!config.transport.pause_on_scrub);
        assert_eq!(config.transport.drift_tolerance_seconds, 0.1);
        assert_eq!(config.project.fps, 30.0);
        assert_eq!(config.services.backoff_max_ms, 8_000);
    }

    #[test]
    fn missing_file_is_default() {
        let path = std::env::temp_dir().join(format!("missing-{}.json", uuid::Uuid::new_v4()));
        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn overrides_skip_blank_values() {
        let mut config = EditorConfig::default();
        config.apply_overrides(|key| match key {
            ENV_API_URL => Some("https://api.example.test".to_string()),
            ENV_STATUS_URL => Some("   ".to_string()),
            ENV_PAUSE_ON_SCRUB => Some("off".to_string()),
            _ => None,
        });
        assert_eq!(config.services.api_base_url, "https://api.example.test");
        assert_eq!(config.services.status_url, "ws://localhost:8000/ws");
        assert_eq!(config.services.access_token, None);
        assert!(!config.transport.pause_on_scrub);
    }
}
