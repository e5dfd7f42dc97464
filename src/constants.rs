//! Shared editing constants: timeline geometry, snap tolerance, and value ranges.

/// Pixels per second at zoom 1.0.
pub const PIXELS_PER_UNIT_ZOOM: f64 = 10.0;
/// Visual snap distance, independent of zoom.
pub const TIMELINE_SNAP_THRESHOLD_PX: f64 = 10.0;
pub const TIMELINE_MIN_ZOOM: f64 = 0.1;
pub const TIMELINE_MAX_ZOOM: f64 = 10.0;
pub const TIMELINE_DEFAULT_ZOOM: f64 = 1.0;
pub const TIMELINE_ZOOM_STEP_IN: f64 = 1.25;
pub const TIMELINE_ZOOM_STEP_OUT: f64 = 0.8;

/// Half-width of the playhead grab region in pixels.
pub const PLAYHEAD_HIT_HALF_WIDTH_PX: f64 = 6.0;
/// Width of the trim handles on each clip edge.
pub const TRIM_HANDLE_WIDTH_PX: f64 = 8.0;

/// Shortest clip the timeline allows, in seconds.
pub const MIN_CLIP_DURATION_SECONDS: f64 = 0.1;
pub const DEFAULT_CLIP_DURATION_SECONDS: f64 = 5.0;
pub const DEFAULT_PROJECT_MIN_DURATION_SECONDS: f64 = 60.0;
pub const DEFAULT_FPS: f64 = 30.0;
pub const DEFAULT_RESOLUTION_WIDTH: u32 = 1920;
pub const DEFAULT_RESOLUTION_HEIGHT: u32 = 1080;

pub const SCALE_MIN: f64 = 0.1;
pub const SCALE_MAX: f64 = 5.0;
pub const POSITION_LIMIT: f64 = 10_000.0;
pub const FILTER_MIN: f64 = 0.0;
pub const FILTER_MAX: f64 = 200.0;
pub const CLIP_VOLUME_MIN: f64 = 0.0;
pub const CLIP_VOLUME_MAX: f64 = 200.0;

/// Surface drift above this forces a re-seek.
pub const TRANSPORT_DRIFT_TOLERANCE_SECONDS: f64 = 0.1;
pub const TRANSPORT_DEFAULT_UNMUTE_VOLUME: f64 = 0.5;
pub const TRANSPORT_LARGE_STEP_FRAMES: i32 = 10;
pub const TRANSPORT_JUMP_SECONDS: f64 = 1.0;

/// Largest upload accepted by the ingestion service (100 MB).
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

pub const STATUS_BACKOFF_INITIAL_MS: u64 = 500;
pub const STATUS_BACKOFF_MAX_MS: u64 = 8_000;

pub const ACCENT_VIDEO: &str = "#22c55e";
pub const ACCENT_AUDIO: &str = "#3b82f6";
pub const ACCENT_CAPTIONS: &str = "#f97316";
