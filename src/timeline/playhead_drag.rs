use tracing::debug;

use crate::constants::PLAYHEAD_HIT_HALF_WIDTH_PX;
use crate::core::time_space::{to_pixels, to_seconds};

/// An active playhead drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayheadGesture {
    /// Pointer x minus the playhead x at pointer-down.
    pub offset_px: f64,
}

/// Playhead drag state: idle, or dragging with a captured offset.
#[derive(Clone, Debug, Default)]
pub struct PlayheadDrag {
    gesture: Option<PlayheadGesture>,
}

impl PlayheadDrag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn gesture(&self) -> Option<PlayheadGesture> {
        self.gesture
    }

    /// Whether `pointer_x` lands on the playhead handle.
    pub fn hit_test(pointer_x: f64, playhead_time: f64, zoom: f64) -> bool {
        (pointer_x - to_pixels(playhead_time, zoom)).abs() <= PLAYHEAD_HIT_HALF_WIDTH_PX
    }

    /// Starts a drag when the pointer is on the handle.
    pub fn pointer_down(&mut self, pointer_x: f64, playhead_time: f64, zoom: f64) -> bool {
        if !Self::hit_test(pointer_x, playhead_time, zoom) {
            return false;
        }
        let offset_px = pointer_x - to_pixels(playhead_time, zoom);
        self.gesture = Some(PlayheadGesture { offset_px });
        debug!(offset_px, "playhead drag started");
        true
    }

    /// New playhead time for a pointer move, clamped to `[0, duration]`.
    pub fn pointer_move(&self, pointer_x: f64, zoom: f64, duration: f64) -> Option<f64> {
        let gesture = self.gesture?;
        Some(time_at(pointer_x - gesture.offset_px, zoom, duration))
    }

    /// Ends the drag. Returns whether one was active.
    pub fn pointer_up(&mut self) -> bool {
        self.gesture.take().is_some()
    }

    /// A click on empty timeline relocates the playhead, except mid-drag.
    pub fn background_click(&self, pointer_x: f64, zoom: f64, duration: f64) -> Option<f64> {
        if self.is_dragging() {
            return None;
        }
        Some(time_at(pointer_x, zoom, duration))
    }
}

fn time_at(pixels: f64, zoom: f64, duration: f64) -> f64 {
    to_seconds(pixels, zoom).clamp(0.0, duration.max(0.0))
}
