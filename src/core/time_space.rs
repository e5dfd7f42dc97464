//! Conversion between timeline seconds and pixels.
//!
//! Zoom is a plain multiplier on [`PIXELS_PER_UNIT_ZOOM`]. Callers clamp it
//! with [`crate::timeline::clamp_zoom`]; these functions assume it is positive.

use crate::constants::PIXELS_PER_UNIT_ZOOM;

/// Pixels covered by one second at `zoom`.
pub fn pixels_per_second(zoom: f64) -> f64 {
    debug_assert!(zoom > 0.0, "zoom must be positive");
    zoom * PIXELS_PER_UNIT_ZOOM
}

/// Horizontal offset of `seconds` from the timeline origin.
pub fn to_pixels(seconds: f64, zoom: f64) -> f64 {
    seconds * pixels_per_second(zoom)
}

/// Timeline time under a horizontal offset.
pub fn to_seconds(pixels: f64, zoom: f64) -> f64 {
    pixels / pixels_per_second(zoom)
}
