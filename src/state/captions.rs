//! Caption job model.
//!
//! A captioning job turns one media item into timed text segments. The job is
//! tracked here while pending; its result is appended to the project in one
//! step when it completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One timed piece of transcribed text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSegment {
    pub text: String,
    /// Start in seconds
    pub start: f64,
    /// End in seconds
    pub end: f64,
    #[serde(default)]
    pub confidence: f64,
}

/// Output of a finished transcription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionResult {
    pub segments: Vec<CaptionSegment>,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub duration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionJobStatus {
    Pending,
    Completed,
    Failed,
}

impl CaptionJobStatus {
    /// Parses the status strings used on the status channel.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" | "queued" | "running" | "processing" => Some(Self::Pending),
            "completed" | "complete" | "succeeded" | "success" => Some(Self::Completed),
            "failed" | "error" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// A captioning request in flight. The session holds at most one.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionJob {
    pub id: Uuid,
    pub media_id: String,
    pub created_at: DateTime<Utc>,
}

impl CaptionJob {
    pub fn new(media_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            media_id: media_id.into(),
            created_at: Utc::now(),
        }
    }
}
