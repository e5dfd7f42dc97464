use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Clip;
use crate::constants::{ACCENT_AUDIO, ACCENT_CAPTIONS, ACCENT_VIDEO};
use crate::core::timeline_snap::SnapTarget;

/// The semantic kind of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    /// Video track - holds video and image clips
    Video,
    /// Audio track - holds audio clips
    Audio,
    /// Captions track - holds text clips produced by transcription
    Captions,
}

impl TrackKind {
    pub fn label(self) -> &'static str {
        match self {
            TrackKind::Video => "Video",
            TrackKind::Audio => "Audio",
            TrackKind::Captions => "Captions",
        }
    }

    /// Default clip color for this lane.
    pub fn accent(self) -> &'static str {
        match self {
            TrackKind::Video => ACCENT_VIDEO,
            TrackKind::Audio => ACCENT_AUDIO,
            TrackKind::Captions => ACCENT_CAPTIONS,
        }
    }
}

/// A lane of clips in the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique identifier
    pub id: Uuid,
    /// Semantic kind of the clips on this track
    pub kind: TrackKind,
    /// Display name (e.g., "Video 1", "Captions")
    pub name: String,
    /// Locked tracks reject every clip mutation
    #[serde(default)]
    pub locked: bool,
    /// Hidden tracks are neither rendered nor interactive
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Clips in insertion order (not sorted by time)
    #[serde(default)]
    pub clips: Vec<Clip>,
}

impl Track {
    /// Create a new, empty track
    pub fn new(name: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            name: name.into(),
            locked: false,
            visible: true,
            clips: Vec::new(),
        }
    }

    /// Create the default video track
    pub fn default_video() -> Self {
        Self::new("Video 1", TrackKind::Video)
    }

    /// Create the default audio track
    pub fn default_audio() -> Self {
        Self::new("Audio 1", TrackKind::Audio)
    }

    /// Create the captions track
    pub fn captions() -> Self {
        Self::new("Captions", TrackKind::Captions)
    }

    /// Whether pointer gestures and clip edits are accepted.
    pub fn is_interactive(&self) -> bool {
        self.visible && !self.locked
    }

    pub fn find_clip(&self, id: Uuid) -> Option<&Clip> {
        self.clips.iter().find(|clip| clip.id == id)
    }

    pub fn find_clip_mut(&mut self, id: Uuid) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|clip| clip.id == id)
    }

    /// End of the last clip on this track.
    pub fn end_time(&self) -> f64 {
        self.clips.iter().map(|clip| clip.end_time).fold(0.0, f64::max)
    }

    /// Snap references for a drag on this track: every other clip's edges plus the origin.
    pub fn snap_targets(&self, exclude_clip_id: Option<Uuid>) -> Vec<SnapTarget> {
        let mut targets = vec![SnapTarget::origin()];
        for clip in self.clips.iter() {
            if Some(clip.id) == exclude_clip_id {
                continue;
            }
            targets.push(SnapTarget::clip_edge(clip.start_time, clip.id));
            targets.push(SnapTarget::clip_edge(clip.end_time, clip.id));
        }
        targets
    }
}

fn default_visible() -> bool {
    true
}
