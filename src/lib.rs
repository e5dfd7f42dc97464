//! AI Video Editor core
//!
//! Timeline editing and transport synchronization for a browser-based video
//! editor. The host renders the UI and owns the `<video>` element; this crate
//! owns the project model, pointer gestures, snapping, playback clock,
//! inspector edits, caption insertion and persistence.
//!
//! Start from [`session::EditorSession`]: feed it [`session::Command`]s and
//! render from the [`session::Event`]s it returns.

pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod hotkeys;
pub mod providers;
pub mod session;
pub mod state;
pub mod timeline;
pub mod utils;

pub use config::EditorConfig;
pub use error::{EditorError, Result};
pub use session::{Command, EditorSession, Event, PreviewSource};
pub use state::{Clip, Project, Track, TrackKind};
