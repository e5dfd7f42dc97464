//! Media items
//!
//! Media items are the records returned by the ingestion service. The core
//! never decodes media; it only resolves a clip's `media_id` to a playable
//! reference through the [`MediaLibrary`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// The kind of an ingested file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "aac", "m4a", "ogg"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

impl MediaKind {
    /// Classifies a file by extension, the way the upload endpoint does.
    ///
    /// Returns `None` for anything the ingestion service would reject.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())?;
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            return Some(Self::Video);
        }
        if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            return Some(Self::Audio);
        }
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            return Some(Self::Image);
        }
        None
    }

    /// Best-effort MIME type for an upload of this file.
    pub fn mime_for(path: &Path) -> mime_guess::Mime {
        mime_guess::from_path(path).first_or_octet_stream()
    }

    /// Whether this media can sit on a video track (video or still image)
    pub fn is_visual(self) -> bool {
        matches!(self, MediaKind::Video | MediaKind::Image)
    }

    /// Whether this media carries a source timeline that trims apply to
    pub fn is_timed(self) -> bool {
        matches!(self, MediaKind::Video | MediaKind::Audio)
    }
}

/// Technical metadata extracted at ingestion time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub fps: Option<f64>,
    #[serde(default)]
    pub codec: Option<String>,
}

/// A file record produced by the ingestion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub kind: MediaKind,
    /// User-facing display name (the original file name)
    pub name: String,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub thumbnail_ref: Option<String>,
    /// URL or path the preview surface can load
    pub playable_ref: String,
    #[serde(default)]
    pub metadata: MediaMetadata,
}

impl MediaItem {
    /// Usable duration, ignoring missing or non-positive values.
    pub fn known_duration(&self) -> Option<f64> {
        self.duration_seconds
            .filter(|duration| duration.is_finite() && *duration > 0.0)
    }
}

/// In-memory lookup of ingested media keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MediaLibrary {
    items: HashMap<String, MediaItem>,
}

impl MediaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an item.
    pub fn insert(&mut self, item: MediaItem) {
        self.items.insert(item.id.clone(), item);
    }

    pub fn get(&self, id: &str) -> Option<&MediaItem> {
        self.items.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<MediaItem> {
        self.items.remove(id)
    }

    /// Playable reference for a media id, if it resolves.
    pub fn playable_ref(&self, id: &str) -> Option<&str> {
        self.items
            .get(id)
            .map(|item| item.playable_ref.as_str())
            .filter(|reference| !reference.is_empty())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
