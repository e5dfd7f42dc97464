//! Timeline interaction
//!
//! Pointer gestures on the timeline: dragging the playhead, and moving or
//! trimming clips. Each gesture is an explicit value created on pointer-down
//! and dropped on pointer-up.

mod playhead_drag;
mod clip_drag;

pub use clip_drag::{
    classify_hit, compute_move_start, compute_trim_end, compute_trim_start, ClipDrag, ClipEdit,
    ClipGesture, ClipOrigin, DragMode,
};
pub use playhead_drag::{PlayheadDrag, PlayheadGesture};

use crate::constants::{
    TIMELINE_MAX_ZOOM, TIMELINE_MIN_ZOOM, TIMELINE_ZOOM_STEP_IN, TIMELINE_ZOOM_STEP_OUT,
};

/// Clamps a zoom factor into the supported range. Non-finite input yields the minimum.
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.clamp(TIMELINE_MIN_ZOOM, TIMELINE_MAX_ZOOM)
    } else {
        TIMELINE_MIN_ZOOM
    }
}

pub fn zoom_in(zoom: f64) -> f64 {
    clamp_zoom(zoom * TIMELINE_ZOOM_STEP_IN)
}

pub fn zoom_out(zoom: f64) -> f64 {
    clamp_zoom(zoom * TIMELINE_ZOOM_STEP_OUT)
}

/// Total timeline width in pixels for a project of `duration` seconds.
pub fn content_width(duration: f64, zoom: f64) -> f64 {
    crate::core::time_space::to_pixels(duration.max(0.0), zoom)
}
