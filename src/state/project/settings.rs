use serde::{Deserialize, Serialize};

use crate::config::ProjectDefaults;
use crate::constants::{
    DEFAULT_FPS, DEFAULT_PROJECT_MIN_DURATION_SECONDS, DEFAULT_RESOLUTION_HEIGHT,
    DEFAULT_RESOLUTION_WIDTH,
};

/// Project-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Frame rate (frames per second); also the transport's frame-step rate
    pub fps: f64,
    /// Lower bound for the derived project duration, in seconds
    #[serde(default = "default_min_duration_seconds")]
    pub min_duration_seconds: f64,
}

fn default_min_duration_seconds() -> f64 {
    DEFAULT_PROJECT_MIN_DURATION_SECONDS
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_RESOLUTION_WIDTH,
            height: DEFAULT_RESOLUTION_HEIGHT,
            fps: DEFAULT_FPS,
            min_duration_seconds: default_min_duration_seconds(),
        }
    }
}

impl From<&ProjectDefaults> for ProjectSettings {
    fn from(value: &ProjectDefaults) -> Self {
        Self {
            width: value.resolution_width,
            height: value.resolution_height,
            fps: value.fps,
            min_duration_seconds: value.min_duration_seconds,
        }
    }
}
