//! Project data model
//!
//! Tracks own their clips; the project owns the tracks and derives the
//! overall duration from them.

mod project;
mod track;
mod clip;
mod properties;
mod settings;
mod persistence;

pub use project::Project;
pub use track::{Track, TrackKind};
pub use clip::{max_trim, Clip};
pub use properties::{
    clamp_clip_volume, clamp_filter, clamp_position, clamp_scale, wrap_rotation, AudioSettings,
    ClipProperties, Filters, Transform,
};
pub use settings::ProjectSettings;
pub use persistence::{ProjectRecord, TracksData};
