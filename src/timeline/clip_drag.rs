use tracing::{debug, warn};
use uuid::Uuid;

use crate::constants::{TIMELINE_SNAP_THRESHOLD_PX, TRIM_HANDLE_WIDTH_PX};
use crate::core::time_space::pixels_per_second;
use crate::core::timeline_snap::resolve;
use crate::state::{max_trim, Clip, Project};

/// Which part of a clip a gesture manipulates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragMode {
    /// Clip body: moves the clip, keeping its duration.
    Move,
    /// Left handle: adjusts the head trim.
    TrimStart,
    /// Right handle: adjusts the tail trim.
    TrimEnd,
}

/// Clip values captured at pointer-down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipOrigin {
    pub start: f64,
    pub end: f64,
    pub trim_start: f64,
    pub trim_end: f64,
}

impl From<&Clip> for ClipOrigin {
    fn from(clip: &Clip) -> Self {
        Self {
            start: clip.start_time,
            end: clip.end_time,
            trim_start: clip.trim_start,
            trim_end: clip.trim_end,
        }
    }
}

impl ClipOrigin {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A mutation produced by a clip gesture, applied to the project as one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClipEdit {
    Move {
        clip_id: Uuid,
        start: f64,
        /// Reference time the start snapped onto, if any
        snapped_to: Option<f64>,
    },
    TrimStart {
        clip_id: Uuid,
        trim_start: f64,
    },
    TrimEnd {
        clip_id: Uuid,
        trim_end: f64,
    },
    /// Put the clip back to its pointer-down values.
    Restore {
        clip_id: Uuid,
        original: ClipOrigin,
    },
}

impl ClipEdit {
    pub fn clip_id(&self) -> Uuid {
        match *self {
            ClipEdit::Move { clip_id, .. }
            | ClipEdit::TrimStart { clip_id, .. }
            | ClipEdit::TrimEnd { clip_id, .. }
            | ClipEdit::Restore { clip_id, .. } => clip_id,
        }
    }

    pub fn apply(&self, project: &mut Project) -> bool {
        match *self {
            ClipEdit::Move { clip_id, start, .. } => project.move_clip(clip_id, start),
            ClipEdit::TrimStart {
                clip_id,
                trim_start,
            } => project.set_trim_start(clip_id, trim_start),
            ClipEdit::TrimEnd { clip_id, trim_end } => {
                project.set_trim_end(clip_id, trim_end)
            }
            ClipEdit::Restore { clip_id, original } => {
                project.resize_clip(clip_id, original.start, original.end)
                    && project.set_trim_start(clip_id, original.trim_start)
                    && project.set_trim_end(clip_id, original.trim_end)
            }
        }
    }
}

// ── Pure time calculations (testable without a project) ──

/// Picks the gesture mode from where the pointer lands on a clip.
///
/// Clips narrower than both handles are treated as body-only.
pub fn classify_hit(pointer_x: f64, clip_left_px: f64, clip_right_px: f64) -> DragMode {
    let width = clip_right_px - clip_left_px;
    if width <= TRIM_HANDLE_WIDTH_PX * 2.0 {
        return DragMode::Move;
    }
    if pointer_x - clip_left_px <= TRIM_HANDLE_WIDTH_PX {
        DragMode::TrimStart
    } else if clip_right_px - pointer_x <= TRIM_HANDLE_WIDTH_PX {
        DragMode::TrimEnd
    } else {
        DragMode::Move
    }
}

/// Unsnapped start for a move, floored at 0.
pub fn compute_move_start(original_start: f64, delta_seconds: f64) -> f64 {
    (original_start + delta_seconds).max(0.0)
}

/// Head trim for a left-handle drag, clamped to `[0, duration - MIN]`.
pub fn compute_trim_start(original: &ClipOrigin, delta_seconds: f64) -> f64 {
    (original.trim_start + delta_seconds).clamp(0.0, max_trim(original.duration()))
}

/// Tail trim for a right-handle drag. Dragging right shrinks the tail trim.
pub fn compute_trim_end(original: &ClipOrigin, delta_seconds: f64) -> f64 {
    (original.trim_end - delta_seconds).clamp(0.0, max_trim(original.duration()))
}

/// An active clip gesture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipGesture {
    pub clip_id: Uuid,
    pub track_id: Uuid,
    pub mode: DragMode,
    pub origin_x: f64,
    pub original: ClipOrigin,
}

impl ClipGesture {
    /// Computes the edit for the pointer at `pointer_x`.
    pub fn edit_at(&self, project: &Project, pointer_x: f64, zoom: f64) -> ClipEdit {
        let delta = (pointer_x - self.origin_x) / pixels_per_second(zoom);
        match self.mode {
            DragMode::Move => {
                let candidate = compute_move_start(self.original.start, delta);
                let targets = project
                    .find_track(self.track_id)
                    .map(|track| track.snap_targets(Some(self.clip_id)))
                    .unwrap_or_default();
                let hit = resolve(
                    candidate,
                    Some(self.clip_id),
                    &targets,
                    TIMELINE_SNAP_THRESHOLD_PX,
                    zoom,
                );
                ClipEdit::Move {
                    clip_id: self.clip_id,
                    start: hit.time.max(0.0),
                    snapped_to: hit.target.map(|target| target.time),
                }
            }
            DragMode::TrimStart => ClipEdit::TrimStart {
                clip_id: self.clip_id,
                trim_start: compute_trim_start(&self.original, delta),
            },
            DragMode::TrimEnd => ClipEdit::TrimEnd {
                clip_id: self.clip_id,
                trim_end: compute_trim_end(&self.original, delta),
            },
        }
    }

    pub fn restore(&self) -> ClipEdit {
        ClipEdit::Restore {
            clip_id: self.clip_id,
            original: self.original,
        }
    }
}

/// Clip drag state: idle, or one active [`ClipGesture`].
#[derive(Clone, Debug, Default)]
pub struct ClipDrag {
    gesture: Option<ClipGesture>,
}

impl ClipDrag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn gesture(&self) -> Option<&ClipGesture> {
        self.gesture.as_ref()
    }

    /// Begins a gesture on `clip_id` and selects the clip.
    ///
    /// Rejected when the clip is unknown or its track is locked or hidden.
    pub fn pointer_down(
        &mut self,
        project: &mut Project,
        clip_id: Uuid,
        mode: DragMode,
        pointer_x: f64,
    ) -> Option<ClipGesture> {
        let track = project.track_of_clip(clip_id)?;
        if !track.is_interactive() {
            warn!(%clip_id, track_id = %track.id, "gesture rejected: track not interactive");
            return None;
        }
        let track_id = track.id;
        let original = ClipOrigin::from(track.find_clip(clip_id)?);
        project.select_clip(clip_id);
        let gesture = ClipGesture {
            clip_id,
            track_id,
            mode,
            origin_x: pointer_x,
            original,
        };
        self.gesture = Some(gesture);
        debug!(%clip_id, ?mode, pointer_x, "clip gesture started");
        Some(gesture)
    }

    /// Applies the edit for a pointer move. Moves are applied in arrival order.
    ///
    /// Nothing is applied once the gesture's track stops being interactive.
    pub fn pointer_move(
        &self,
        project: &mut Project,
        pointer_x: f64,
        zoom: f64,
    ) -> Option<ClipEdit> {
        let gesture = self.gesture?;
        let interactive = project
            .find_track(gesture.track_id)
            .is_some_and(|track| track.is_interactive());
        if !interactive {
            debug!(clip_id = %gesture.clip_id, "move ignored: track not interactive");
            return None;
        }
        let edit = gesture.edit_at(project, pointer_x, zoom);
        if edit.apply(project) {
            Some(edit)
        } else {
            None
        }
    }

    /// Ends the gesture, keeping whatever was applied.
    pub fn pointer_up(&mut self) -> Option<ClipGesture> {
        let gesture = self.gesture.take();
        if let Some(gesture) = &gesture {
            debug!(clip_id = %gesture.clip_id, "clip gesture ended");
        }
        gesture
    }

    /// Ends the gesture and puts the clip back to its pointer-down values.
    pub fn cancel(&mut self, project: &mut Project) -> Option<ClipEdit> {
        let gesture = self.gesture.take()?;
        let edit = gesture.restore();
        edit.apply(project);
        debug!(clip_id = %gesture.clip_id, "clip gesture cancelled");
        Some(edit)
    }
}
