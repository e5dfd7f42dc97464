use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{Clip, ClipProperties, ProjectSettings, Track, TrackKind};
use crate::constants::{DEFAULT_CLIP_DURATION_SECONDS, MIN_CLIP_DURATION_SECONDS};
use crate::state::{CaptionSegment, MediaItem};

/// The main project container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Schema version for future compatibility
    pub version: String,
    /// Project name
    pub name: String,
    /// Project settings (resolution, fps, minimum duration)
    pub settings: ProjectSettings,
    /// All tracks in the project (ordered top to bottom)
    pub tracks: Vec<Track>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: "Untitled Project".to_string(),
            settings: ProjectSettings::default(),
            tracks: vec![Track::default_video(), Track::default_audio()],
        }
    }
}

impl Project {
    /// Create a new project with default settings
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a new project with explicit settings
    pub fn with_settings(name: impl Into<String>, settings: ProjectSettings) -> Self {
        Self {
            name: name.into(),
            settings,
            ..Default::default()
        }
    }

    /// Project duration: the end of the last clip, never below the configured minimum.
    pub fn duration(&self) -> f64 {
        let clip_end = self.tracks.iter().map(Track::end_time).fold(0.0, f64::max);
        clip_end.max(self.settings.min_duration_seconds.max(0.0))
    }

    /// Find a track by ID
    pub fn find_track(&self, id: Uuid) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn find_track_mut(&mut self, id: Uuid) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    /// Find the track holding a clip
    pub fn track_of_clip(&self, clip_id: Uuid) -> Option<&Track> {
        self.tracks
            .iter()
            .find(|track| track.find_clip(clip_id).is_some())
    }

    /// Find a clip anywhere in the project
    pub fn find_clip(&self, clip_id: Uuid) -> Option<&Clip> {
        self.tracks.iter().find_map(|track| track.find_clip(clip_id))
    }

    /// All clips, track by track, in insertion order
    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.tracks.iter().flat_map(|track| track.clips.iter())
    }

    /// Mutable access to a clip, only when its track accepts edits.
    fn editable_clip_mut(&mut self, clip_id: Uuid) -> Option<&mut Clip> {
        let track = self
            .tracks
            .iter_mut()
            .find(|track| track.find_clip(clip_id).is_some())?;
        if track.locked {
            warn!(%clip_id, track_id = %track.id, "edit rejected: track is locked");
            return None;
        }
        track.find_clip_mut(clip_id)
    }

    /// Add a track of the given kind, numbered after existing tracks of that kind
    pub fn add_track(&mut self, kind: TrackKind) -> Uuid {
        let count = self.tracks.iter().filter(|t| t.kind == kind).count();
        let name = match kind {
            TrackKind::Captions if count == 0 => kind.label().to_string(),
            _ => format!("{} {}", kind.label(), count + 1),
        };
        let track = Track::new(name, kind);
        let id = track.id;
        self.tracks.push(track);
        id
    }

    /// Remove a track and its clips
    pub fn remove_track(&mut self, id: Uuid) -> bool {
        let len = self.tracks.len();
        self.tracks.retain(|t| t.id != id);
        self.tracks.len() < len
    }

    pub fn set_track_locked(&mut self, id: Uuid, locked: bool) -> bool {
        if let Some(track) = self.find_track_mut(id) {
            track.locked = locked;
            return true;
        }
        false
    }

    pub fn set_track_visible(&mut self, id: Uuid, visible: bool) -> bool {
        if let Some(track) = self.find_track_mut(id) {
            track.visible = visible;
            return true;
        }
        false
    }

    pub fn rename_track(&mut self, id: Uuid, name: impl Into<String>) -> bool {
        let name = name.into();
        if name.trim().is_empty() {
            return false;
        }
        if let Some(track) = self.find_track_mut(id) {
            track.name = name;
            return true;
        }
        false
    }

    /// Add a clip to a track. The clip is normalized before insertion.
    pub fn add_clip(&mut self, track_id: Uuid, mut clip: Clip) -> Option<Uuid> {
        let track = self.find_track_mut(track_id)?;
        if track.locked {
            warn!(%track_id, "add clip rejected: track is locked");
            return None;
        }
        clip.normalize();
        if clip.color.is_empty() {
            clip.color = track.kind.accent().to_string();
        }
        let id = clip.id;
        track.clips.push(clip);
        Some(id)
    }

    /// Place a media item at `start_time` on the first compatible, editable track.
    ///
    /// Visual media lands on a video track and audio on an audio track. The
    /// clip length is the media's duration when known.
    pub fn place_media(&mut self, media: &MediaItem, start_time: f64) -> Option<Uuid> {
        let target_kind = if media.kind.is_visual() {
            TrackKind::Video
        } else {
            TrackKind::Audio
        };
        let track_id = self
            .tracks
            .iter()
            .find(|t| t.kind == target_kind && t.is_interactive())?
            .id;
        let duration = media
            .known_duration()
            .unwrap_or(DEFAULT_CLIP_DURATION_SECONDS);
        let start = start_time.max(0.0);
        let clip =
            Clip::new(media.id.clone(), start, start + duration).with_name(media.name.clone());
        self.add_clip(track_id, clip)
    }

    /// Remove a clip by ID
    pub fn remove_clip(&mut self, id: Uuid) -> bool {
        for track in self.tracks.iter_mut() {
            if track.find_clip(id).is_none() {
                continue;
            }
            if track.locked {
                return false;
            }
            track.clips.retain(|c| c.id != id);
            return true;
        }
        false
    }

    /// Move a clip to a new start time, keeping its duration
    pub fn move_clip(&mut self, id: Uuid, new_start_time: f64) -> bool {
        if let Some(clip) = self.editable_clip_mut(id) {
            clip.move_to(new_start_time);
            return true;
        }
        false
    }

    /// Replace a clip's timeline bounds (minimum duration enforced)
    pub fn resize_clip(&mut self, id: Uuid, new_start: f64, new_end: f64) -> bool {
        if let Some(clip) = self.editable_clip_mut(id) {
            clip.set_bounds(new_start, new_end);
            // Trims stay valid for the new duration.
            let (trim_start, trim_end) = (clip.trim_start, clip.trim_end);
            clip.set_trim_start(trim_start);
            clip.set_trim_end(trim_end);
            return true;
        }
        false
    }

    pub fn set_trim_start(&mut self, id: Uuid, trim_start: f64) -> bool {
        if let Some(clip) = self.editable_clip_mut(id) {
            clip.set_trim_start(trim_start);
            return true;
        }
        false
    }

    pub fn set_trim_end(&mut self, id: Uuid, trim_end: f64) -> bool {
        if let Some(clip) = self.editable_clip_mut(id) {
            clip.set_trim_end(trim_end);
            return true;
        }
        false
    }

    /// Update a clip's display name (blank names are ignored)
    pub fn set_clip_name(&mut self, id: Uuid, name: impl Into<String>) -> bool {
        let name = name.into();
        if name.trim().is_empty() {
            return false;
        }
        if let Some(clip) = self.editable_clip_mut(id) {
            clip.name = name;
            return true;
        }
        false
    }

    /// Select exactly one clip, clearing the flag everywhere else.
    pub fn select_clip(&mut self, id: Uuid) -> bool {
        if self.find_clip(id).is_none() {
            return false;
        }
        for clip in self.tracks.iter_mut().flat_map(|t| t.clips.iter_mut()) {
            clip.selected = clip.id == id;
        }
        true
    }

    pub fn clear_selection(&mut self) {
        for clip in self.tracks.iter_mut().flat_map(|t| t.clips.iter_mut()) {
            clip.selected = false;
        }
    }

    /// Return the selected clip, if any
    pub fn selected_clip(&self) -> Option<&Clip> {
        self.clips().find(|clip| clip.selected)
    }

    /// Replace a clip's properties; values are clamped before they are stored.
    pub fn set_clip_properties(&mut self, id: Uuid, properties: ClipProperties) -> bool {
        if let Some(clip) = self.editable_clip_mut(id) {
            clip.properties = properties.normalized();
            return true;
        }
        false
    }

    /// Apply `edit` to a clip's properties, then clamp the result.
    pub fn update_clip_properties(
        &mut self,
        id: Uuid,
        edit: impl FnOnce(&mut ClipProperties),
    ) -> bool {
        if let Some(clip) = self.editable_clip_mut(id) {
            let mut properties = clip.properties;
            edit(&mut properties);
            clip.properties = properties.normalized();
            return true;
        }
        false
    }

    /// Find the captions track, if one exists
    pub fn captions_track(&self) -> Option<&Track> {
        self.tracks.iter().find(|t| t.kind == TrackKind::Captions)
    }

    /// Append one caption clip per segment to the captions track, creating the
    /// track first when the project has none.
    ///
    /// All clips are built before the project is touched, so the append is a
    /// single step. Returns the captions track id.
    pub fn append_captions(&mut self, media_id: &str, segments: &[CaptionSegment]) -> Uuid {
        let color = TrackKind::Captions.accent();
        let clips: Vec<Clip> = segments
            .iter()
            .map(|segment| {
                let end = segment.end.max(segment.start + MIN_CLIP_DURATION_SECONDS);
                Clip::new(media_id, segment.start, end)
                    .with_name(segment.text.trim())
                    .with_color(color)
            })
            .collect();

        let track_index = match self
            .tracks
            .iter()
            .position(|t| t.kind == TrackKind::Captions)
        {
            Some(index) => index,
            None => {
                self.tracks.push(Track::captions());
                self.tracks.len() - 1
            }
        };
        let track = &mut self.tracks[track_index];
        let count = clips.len();
        track.clips.extend(clips);
        info!(track_id = %track.id, count, "captions appended");
        track.id
    }

    /// Topmost visible video clip under `time`, if any.
    pub fn visual_clip_at(&self, time: f64) -> Option<&Clip> {
        self.tracks
            .iter()
            .filter(|t| t.kind == TrackKind::Video && t.visible)
            .find_map(|t| t.clips.iter().find(|clip| clip.contains(time)))
    }

    /// First visible clip of any audible kind under `time`, video first.
    pub fn playable_clip_at(&self, time: f64) -> Option<&Clip> {
        self.visual_clip_at(time).or_else(|| {
            self.tracks
                .iter()
                .filter(|t| t.kind == TrackKind::Audio && t.visible)
                .find_map(|t| t.clips.iter().find(|clip| clip.contains(time)))
        })
    }

    /// Clamp every clip back into its invariants. Returns how many clips changed.
    pub fn normalize(&mut self) -> usize {
        let mut changed = 0;
        for clip in self.tracks.iter_mut().flat_map(|t| t.clips.iter_mut()) {
            let before = clip.clone();
            clip.normalize();
            if *clip != before {
                changed += 1;
            }
        }
        let mut seen_selected = false;
        for clip in self.tracks.iter_mut().flat_map(|t| t.clips.iter_mut()) {
            if clip.selected && seen_selected {
                clip.selected = false;
                changed += 1;
            }
            seen_selected |= clip.selected;
        }
        if changed > 0 {
            debug!(changed, "project normalized");
        }
        changed
    }
}
