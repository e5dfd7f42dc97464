use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{Project, ProjectSettings, Track};
use crate::constants::DEFAULT_FPS;
use crate::error::{EditorError, Result};

const PROJECT_FILE: &str = "project.json";
const PROJECT_FILE_TMP: &str = "project.json.tmp";

/// Track payload stored in a project record's `tracks_data` column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TracksData {
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// Project shape exchanged with the project store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub name: String,
    /// Derived project duration in seconds at save time
    pub duration: f64,
    /// Whole frames per second; the store keeps an integer column
    pub fps: u32,
    pub resolution_width: u32,
    pub resolution_height: u32,
    #[serde(default)]
    pub tracks_data: TracksData,
}

impl Project {
    /// Snapshot the project into its store record.
    pub fn to_record(&self) -> ProjectRecord {
        ProjectRecord {
            name: self.name.clone(),
            duration: self.duration(),
            fps: record_fps(self.settings.fps),
            resolution_width: self.settings.width,
            resolution_height: self.settings.height,
            tracks_data: TracksData {
                tracks: self.tracks.clone(),
            },
        }
    }

    /// Rebuild a project from a store record.
    ///
    /// The saved duration becomes the minimum duration so that saving again
    /// reproduces the same record. Clips are normalized on the way in.
    pub fn from_record(record: ProjectRecord) -> Self {
        let defaults = ProjectSettings::default();
        let fps = if record.fps > 0 {
            f64::from(record.fps)
        } else {
            defaults.fps
        };
        let min_duration_seconds = if record.duration.is_finite() {
            record.duration.max(0.0)
        } else {
            defaults.min_duration_seconds
        };
        let mut project = Project {
            name: record.name,
            settings: ProjectSettings {
                width: record.resolution_width,
                height: record.resolution_height,
                fps,
                min_duration_seconds,
            },
            tracks: record.tracks_data.tracks,
            ..Project::default()
        };
        let repaired = project.normalize();
        if repaired > 0 {
            warn!(repaired, "project record contained out-of-range clips");
        }
        project
    }

    // =========================================================================
    // Save/Load
    // =========================================================================

    /// Save the project to `folder/project.json`.
    ///
    /// Writes a temporary file first and renames it over the old one.
    pub fn save_to(&self, folder: &Path) -> Result<()> {
        fs::create_dir_all(folder)?;
        let json = serde_json::to_string_pretty(self)?;
        let path = folder.join(PROJECT_FILE);
        let tmp_path = folder.join(PROJECT_FILE_TMP);
        fs::write(&tmp_path, json)?;
        if path.exists() {
            let _ = fs::remove_file(&path);
        }
        fs::rename(&tmp_path, &path)?;
        info!(path = %path.display(), "project saved");
        Ok(())
    }

    /// Load a project from a folder.
    ///
    /// Falls back to a leftover temporary file when an interrupted save
    /// removed the main file.
    pub fn load(folder: &Path) -> Result<Self> {
        let path = project_file(folder)?;
        let json = fs::read_to_string(&path)?;
        let mut project: Project =
            serde_json::from_str(&json).map_err(|err| EditorError::InvalidProjectFile {
                reason: err.to_string(),
            })?;
        let repaired = project.normalize();
        if repaired > 0 {
            warn!(repaired, path = %path.display(), "project file contained out-of-range clips");
        }
        info!(path = %path.display(), name = %project.name, "project loaded");
        Ok(project)
    }
}

fn project_file(folder: &Path) -> Result<PathBuf> {
    let path = folder.join(PROJECT_FILE);
    if path.exists() {
        return Ok(path);
    }
    let tmp_path = folder.join(PROJECT_FILE_TMP);
    if tmp_path.exists() {
        return Ok(tmp_path);
    }
    Err(EditorError::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("no {PROJECT_FILE} in {}", folder.display()),
    )))
}

/// Rounds the editor frame rate to the store's whole-number column.
fn record_fps(fps: f64) -> u32 {
    if fps.is_finite() && fps >= 1.0 {
        fps.round().min(f64::from(u32::MAX)) as u32
    } else {
        DEFAULT_FPS.round() as u32
    }
}
