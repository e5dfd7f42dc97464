//! Property inspector binding.
//!
//! Maps the current selection to an editable property view and routes edits
//! back into the project. Every write goes through the project's clamping, so
//! an edit can never store an out-of-range value.

use std::fmt;
use tracing::debug;
use uuid::Uuid;

use crate::state::{ClipProperties, Project};
use crate::utils::parse_f64_input;

/// What the inspector shows.
#[derive(Clone, Debug, PartialEq)]
pub enum InspectorView {
    /// Nothing is selected.
    Empty,
    Clip {
        clip_id: Uuid,
        track_id: Uuid,
        name: String,
        /// Edits are rejected while the owning track is locked.
        locked: bool,
        properties: ClipProperties,
    },
}

impl InspectorView {
    pub fn is_empty(&self) -> bool {
        matches!(self, InspectorView::Empty)
    }
}

/// A numeric field of [`ClipProperties`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyField {
    X,
    Y,
    Scale,
    Rotation,
    Brightness,
    Contrast,
    Saturation,
    Volume,
}

impl PropertyField {
    pub const ALL: [PropertyField; 8] = [
        PropertyField::X,
        PropertyField::Y,
        PropertyField::Scale,
        PropertyField::Rotation,
        PropertyField::Brightness,
        PropertyField::Contrast,
        PropertyField::Saturation,
        PropertyField::Volume,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PropertyField::X => "Position X",
            PropertyField::Y => "Position Y",
            PropertyField::Scale => "Scale",
            PropertyField::Rotation => "Rotation",
            PropertyField::Brightness => "Brightness",
            PropertyField::Contrast => "Contrast",
            PropertyField::Saturation => "Saturation",
            PropertyField::Volume => "Volume",
        }
    }

    /// Current value of this field.
    pub fn get(self, properties: &ClipProperties) -> f64 {
        match self {
            PropertyField::X => properties.transform.x,
            PropertyField::Y => properties.transform.y,
            PropertyField::Scale => properties.transform.scale,
            PropertyField::Rotation => properties.transform.rotation,
            PropertyField::Brightness => properties.filters.brightness,
            PropertyField::Contrast => properties.filters.contrast,
            PropertyField::Saturation => properties.filters.saturation,
            PropertyField::Volume => properties.audio.volume,
        }
    }

    /// Raw write; the caller normalizes afterwards.
    fn set(self, properties: &mut ClipProperties, value: f64) {
        match self {
            PropertyField::X => properties.transform.x = value,
            PropertyField::Y => properties.transform.y = value,
            PropertyField::Scale => properties.transform.scale = value,
            PropertyField::Rotation => properties.transform.rotation = value,
            PropertyField::Brightness => properties.filters.brightness = value,
            PropertyField::Contrast => properties.filters.contrast = value,
            PropertyField::Saturation => properties.filters.saturation = value,
            PropertyField::Volume => properties.audio.volume = value,
        }
    }
}

impl fmt::Display for PropertyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Builds the view for the current selection.
pub fn view(project: &Project) -> InspectorView {
    let Some(clip) = project.selected_clip() else {
        return InspectorView::Empty;
    };
    let Some(track) = project.track_of_clip(clip.id) else {
        return InspectorView::Empty;
    };
    InspectorView::Clip {
        clip_id: clip.id,
        track_id: track.id,
        name: clip.name.clone(),
        locked: track.locked,
        properties: clip.properties,
    }
}

/// Writes `value` to `field` of the selected clip. The value is clamped
/// immediately; non-finite input resets the field to its default.
pub fn edit(project: &mut Project, field: PropertyField, value: f64) -> bool {
    let Some(clip_id) = project.selected_clip().map(|clip| clip.id) else {
        return false;
    };
    let value = if value.is_finite() {
        value
    } else {
        field.get(&ClipProperties::default())
    };
    let applied =
        project.update_clip_properties(clip_id, |properties| field.set(properties, value));
    if applied {
        debug!(%clip_id, %field, value, "property edited");
    }
    applied
}

/// Parses user text for `field`. Unparseable text keeps the current value.
pub fn edit_text(project: &mut Project, field: PropertyField, text: &str) -> bool {
    let Some(current) = project.selected_clip().map(|clip| field.get(&clip.properties)) else {
        return false;
    };
    edit(project, field, parse_f64_input(text, current))
}

pub fn set_muted(project: &mut Project, muted: bool) -> bool {
    let Some(clip_id) = project.selected_clip().map(|clip| clip.id) else {
        return false;
    };
    project.update_clip_properties(clip_id, |properties| properties.audio.muted = muted)
}

/// Renames the selected clip.
pub fn rename(project: &mut Project, name: &str) -> bool {
    let Some(clip_id) = project.selected_clip().map(|clip| clip.id) else {
        return false;
    };
    project.set_clip_name(clip_id, name.trim())
}

/// Restores transform, filters and audio of the selected clip in one update.
pub fn reset(project: &mut Project) -> bool {
    let Some(clip_id) = project.selected_clip().map(|clip| clip.id) else {
        return false;
    };
    let applied = project.set_clip_properties(clip_id, ClipProperties::default());
    if applied {
        debug!(%clip_id, "properties reset");
    }
    applied
}
