use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ClipProperties;
use crate::constants::MIN_CLIP_DURATION_SECONDS;

/// A clip placed on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Unique identifier
    pub id: Uuid,
    /// Media item this clip plays (ingestion service id)
    pub media_id: String,
    /// Timeline start in seconds
    pub start_time: f64,
    /// Timeline end in seconds, always at least `MIN_CLIP_DURATION_SECONDS` after the start
    pub end_time: f64,
    /// Source seconds skipped at the head of the media
    #[serde(default)]
    pub trim_start: f64,
    /// Source seconds skipped at the tail of the media
    #[serde(default)]
    pub trim_end: f64,
    #[serde(default)]
    pub selected: bool,
    /// Display color (hex string)
    #[serde(default)]
    pub color: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub properties: ClipProperties,
}

impl Clip {
    /// Create a new clip; the bounds are normalized immediately.
    pub fn new(media_id: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        let mut clip = Self {
            id: Uuid::new_v4(),
            media_id: media_id.into(),
            start_time,
            end_time,
            trim_start: 0.0,
            trim_end: 0.0,
            selected: false,
            color: String::new(),
            name: String::new(),
            properties: ClipProperties::default(),
        };
        clip.normalize();
        clip
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Timeline duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Check if this clip overlaps with a time range
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        self.start_time < end && self.end_time > start
    }

    /// Whether `time` falls inside `[start_time, end_time)`.
    pub fn contains(&self, time: f64) -> bool {
        self.start_time <= time && time < self.end_time
    }

    /// Source-media time played at timeline `time`.
    pub fn source_time_at(&self, time: f64) -> f64 {
        self.trim_start + (time - self.start_time).clamp(0.0, self.duration())
    }

    /// Moves the clip so it starts at `new_start` (floored at 0), keeping its duration.
    pub fn move_to(&mut self, new_start: f64) {
        let duration = self.duration();
        let start = finite_or(new_start, self.start_time).max(0.0);
        self.start_time = start;
        self.end_time = start + duration;
        // start + duration can round below the minimum or shift the trim limit
        self.normalize_bounds();
        self.trim_start = clamp_trim(self.trim_start, self.duration());
        self.trim_end = clamp_trim(self.trim_end, self.duration());
    }

    /// Replaces both bounds, enforcing the minimum duration.
    pub fn set_bounds(&mut self, start: f64, end: f64) {
        self.start_time = start;
        self.end_time = end;
        self.normalize_bounds();
    }

    /// Sets the head trim, clamped to `[0, duration - MIN]`.
    pub fn set_trim_start(&mut self, trim_start: f64) {
        self.trim_start = clamp_trim(trim_start, self.duration());
    }

    /// Sets the tail trim, clamped to `[0, duration - MIN]`.
    pub fn set_trim_end(&mut self, trim_end: f64) {
        self.trim_end = clamp_trim(trim_end, self.duration());
    }

    /// Restores every invariant in place. Stable when applied twice.
    pub fn normalize(&mut self) {
        self.normalize_bounds();
        self.trim_start = clamp_trim(self.trim_start, self.duration());
        self.trim_end = clamp_trim(self.trim_end, self.duration());
        self.properties = self.properties.normalized();
    }

    fn normalize_bounds(&mut self) {
        let start = finite_or(self.start_time, 0.0).max(0.0);
        let end = finite_or(self.end_time, start);
        self.start_time = start;
        self.end_time = end.max(start + MIN_CLIP_DURATION_SECONDS);
    }
}

/// Upper trim bound for a clip of `duration` seconds.
pub fn max_trim(duration: f64) -> f64 {
    (duration - MIN_CLIP_DURATION_SECONDS).max(0.0)
}

fn clamp_trim(value: f64, duration: f64) -> f64 {
    finite_or(value, 0.0).clamp(0.0, max_trim(duration))
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
