//! State management module
//!
//! This module contains the core data structures of the editor:
//! - Project: The top-level container for a video project
//! - Track: Timeline lanes (Video, Audio, Captions)
//! - Clip: Media placements on tracks, with trims and properties
//! - Media: Ingested file records and their lookup
//! - Captions: Transcription results and job tracking

mod project;
mod media;
mod captions;

pub use project::*;
pub use media::*;
pub use captions::*;
