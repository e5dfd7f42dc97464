//! Hotkey system
//!
//! Centralized hotkey mapping for the editor.
//!
//! # Architecture
//!
//! - **Key** / **Modifiers**: A host-neutral description of a key press
//! - **HotkeyAction**: Enum of all possible actions that can be triggered by hotkeys
//! - **HotkeyContext**: Determines which hotkeys are active based on editor state
//! - **handle_hotkey()**: Main dispatch function that maps key events to actions
//!
//! # Adding New Hotkeys
//!
//! 1. Add a variant to `HotkeyAction`
//! 2. Add the key binding in `handle_hotkey()`
//! 3. Handle the action in `EditorSession::apply_hotkey`

use crate::constants::{TRANSPORT_JUMP_SECONDS, TRANSPORT_LARGE_STEP_FRAMES};

/// A key as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A printable character (" " for the space bar).
    Character(String),
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Escape,
    Enter,
    Tab,
    Other(String),
}

impl Key {
    pub fn character(c: &str) -> Self {
        Key::Character(c.to_string())
    }

    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_dom(value: &str) -> Self {
        match value {
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "Home" => Key::Home,
            "End" => Key::End,
            "Escape" | "Esc" => Key::Escape,
            "Enter" => Key::Enter,
            "Tab" => Key::Tab,
            "Spacebar" => Key::Character(" ".to_string()),
            other if other.chars().count() == 1 => Key::Character(other.to_string()),
            other => Key::Other(other.to_string()),
        }
    }
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// All possible actions that can be triggered by hotkeys.
///
/// Each variant represents a semantic action, not a key binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HotkeyAction {
    // ═══════════════════════════════════════════════════════════════
    // Transport
    // ═══════════════════════════════════════════════════════════════
    /// Toggle playback.
    PlayPause,
    /// Step by a signed number of frames.
    StepFrames(i32),
    SeekStart,
    SeekEnd,
    /// Relative seek in seconds.
    Jump(f64),

    // ═══════════════════════════════════════════════════════════════
    // Timeline
    // ═══════════════════════════════════════════════════════════════
    /// Zoom in on the timeline (increase pixels per second)
    TimelineZoomIn,
    /// Zoom out on the timeline (decrease pixels per second)
    TimelineZoomOut,
    /// Abort the active clip gesture and restore the clip.
    CancelDrag,

    /// Save the current project.
    SaveProject,
}

/// Context information that affects which hotkeys are active.
#[derive(Debug, Clone, Default)]
pub struct HotkeyContext {
    /// Whether an input field has focus (suppresses every hotkey)
    pub input_focused: bool,
    /// Whether a pointer gesture is in progress
    pub dragging: bool,
}

/// Result of processing a key event.
#[derive(Debug, Clone, PartialEq)]
pub enum HotkeyResult {
    /// A hotkey action was matched and should be executed
    Action(HotkeyAction),
    /// No matching hotkey for this key/context combination
    NoMatch,
    /// Hotkey would match but is suppressed (e.g., input field focused)
    Suppressed,
}

/// Maps a key event to an action, considering the current context.
pub fn handle_hotkey(key: &Key, modifiers: Modifiers, context: &HotkeyContext) -> HotkeyResult {
    // Suppress hotkeys when typing in an input field
    if context.input_focused {
        return HotkeyResult::Suppressed;
    }

    let step = if modifiers.shift {
        TRANSPORT_LARGE_STEP_FRAMES
    } else {
        1
    };

    let action = match key {
        Key::Character(c) if modifiers.command() && c.eq_ignore_ascii_case("s") => {
            HotkeyAction::SaveProject
        }
        Key::Character(c) if c == " " => HotkeyAction::PlayPause,
        Key::Character(c) if c == "+" || c == "=" => HotkeyAction::TimelineZoomIn,
        Key::Character(c) if c == "-" => HotkeyAction::TimelineZoomOut,
        Key::Character(c) if c.eq_ignore_ascii_case("j") => {
            HotkeyAction::Jump(-TRANSPORT_JUMP_SECONDS)
        }
        Key::Character(c) if c.eq_ignore_ascii_case("l") => {
            HotkeyAction::Jump(TRANSPORT_JUMP_SECONDS)
        }
        Key::ArrowLeft => HotkeyAction::StepFrames(-step),
        Key::ArrowRight => HotkeyAction::StepFrames(step),
        Key::Home => HotkeyAction::SeekStart,
        Key::End => HotkeyAction::SeekEnd,
        Key::Escape if context.dragging => HotkeyAction::CancelDrag,
        _ => return HotkeyResult::NoMatch,
    };
    HotkeyResult::Action(action)
}
