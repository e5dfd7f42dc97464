use serde::{Deserialize, Serialize};

use crate::constants::{
    CLIP_VOLUME_MAX, CLIP_VOLUME_MIN, FILTER_MAX, FILTER_MIN, POSITION_LIMIT, SCALE_MAX,
    SCALE_MIN,
};
use crate::utils::clamp_finite;

/// Transform controls for a visual clip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Horizontal translation in project pixels.
    #[serde(default)]
    pub x: f64,
    /// Vertical translation in project pixels.
    #[serde(default)]
    pub y: f64,
    /// Uniform scale factor.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Rotation in degrees, always within `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: default_scale(),
            rotation: 0.0,
        }
    }
}

impl Transform {
    /// Returns a copy with every field clamped or wrapped into range.
    pub fn normalized(self) -> Self {
        Self {
            x: clamp_position(self.x),
            y: clamp_position(self.y),
            scale: clamp_scale(self.scale),
            rotation: wrap_rotation(self.rotation),
        }
    }
}

/// Color filters, as percentages where 100 leaves the image unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default = "default_percent")]
    pub brightness: f64,
    #[serde(default = "default_percent")]
    pub contrast: f64,
    #[serde(default = "default_percent")]
    pub saturation: f64,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            brightness: default_percent(),
            contrast: default_percent(),
            saturation: default_percent(),
        }
    }
}

impl Filters {
    pub fn normalized(self) -> Self {
        Self {
            brightness: clamp_filter(self.brightness),
            contrast: clamp_filter(self.contrast),
            saturation: clamp_filter(self.saturation),
        }
    }
}

/// Per-clip audio settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Volume percentage (100 = source level).
    #[serde(default = "default_percent")]
    pub volume: f64,
    #[serde(default)]
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: default_percent(),
            muted: false,
        }
    }
}

impl AudioSettings {
    pub fn normalized(self) -> Self {
        Self {
            volume: clamp_clip_volume(self.volume),
            muted: self.muted,
        }
    }
}

/// All editable properties of a clip.
///
/// Every group and field carries a serde default, so partially specified
/// records (older saves, hand-written JSON) deserialize into complete values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipProperties {
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub filters: Filters,
    #[serde(default)]
    pub audio: AudioSettings,
}

impl ClipProperties {
    pub fn normalized(self) -> Self {
        Self {
            transform: self.transform.normalized(),
            filters: self.filters.normalized(),
            audio: self.audio.normalized(),
        }
    }
}

pub fn clamp_scale(value: f64) -> f64 {
    clamp_finite(value, SCALE_MIN, SCALE_MAX, default_scale())
}

pub fn clamp_position(value: f64) -> f64 {
    clamp_finite(value, -POSITION_LIMIT, POSITION_LIMIT, 0.0)
}

pub fn clamp_filter(value: f64) -> f64 {
    clamp_finite(value, FILTER_MIN, FILTER_MAX, default_percent())
}

pub fn clamp_clip_volume(value: f64) -> f64 {
    clamp_finite(value, CLIP_VOLUME_MIN, CLIP_VOLUME_MAX, default_percent())
}

/// Wraps degrees into `[0, 360)`.
pub fn wrap_rotation(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round tiny negatives up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

fn default_scale() -> f64 {
    1.0
}

fn default_percent() -> f64 {
    100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps_both_directions() {
        assert_eq!(wrap_rotation(370.0), 10.0);
        assert_eq!(wrap_rotation(-10.0), 350.0);
        assert_eq!(wrap_rotation(360.0), 0.0);
        assert_eq!(wrap_rotation(-1e-20), 0.0);
    }

    #[test]
    fn scale_clamps_to_range() {
        assert_eq!(clamp_scale(7.0), 5.0);
        assert_eq!(clamp_scale(0.0), 0.1);
        assert_eq!(clamp_scale(f64::NAN), 1.0);
    }

    #[test]
    fn normalization_is_idempotent() {
        let props = ClipProperties {
            transform: Transform {
                x: 20_000.0,
                y: -3.5,
                scale: 9.0,
                rotation: -725.0,
            },
            filters: Filters {
                brightness: -4.0,
                contrast: 250.0,
                saturation: 130.0,
            },
            audio: AudioSettings {
                volume: 500.0,
                muted: true,
            },
        };
        let once = props.normalized();
        assert_eq!(once, once.normalized());
        assert_eq!(once.transform.x, 10_000.0);
        assert_eq!(once.transform.rotation, 355.0);
        assert_eq!(once.filters.brightness, 0.0);
        assert_eq!(once.filters.contrast, 200.0);
        assert_eq!(once.audio.volume, 200.0);
    }

    #[test]
    fn partial_record_merges_over_defaults() {
        let props: ClipProperties =
            serde_json::from_str(r#"{"transform":{"scale":2.0},"audio":{"muted":true}}"#).unwrap();
        assert_eq!(props.transform.scale, 2.0);
        assert_eq!(props.transform.x, 0.0);
        assert_eq!(props.filters, Filters::default());
        assert_eq!(props.audio.volume, 100.0);
        assert!(props.audio.muted);
    }
}
