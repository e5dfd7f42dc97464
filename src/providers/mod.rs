//! External collaborators
//!
//! The editing core talks to three services: media ingestion, captioning and
//! project storage. Each is a trait so sessions can run against the HTTP
//! client in [`api_client`] or against test doubles. The status channel in
//! [`status_channel`] streams backend events over a WebSocket.

pub mod api_client;
pub mod status_channel;

use std::future::Future;
use std::path::Path;

use crate::error::Result;
use crate::state::{CaptionResult, MediaItem, ProjectRecord};

pub use api_client::{ApiClient, StoredProject};
pub use status_channel::{ChannelMessage, StatusChannel, StatusEvent};

/// Media owned by the ingestion service.
pub trait MediaIngestion {
    /// Uploads a file and returns the ingested media record.
    fn upload(&self, path: &Path) -> impl Future<Output = Result<MediaItem>> + Send;
    fn fetch(&self, id: &str) -> impl Future<Output = Result<MediaItem>> + Send;
    fn list(&self) -> impl Future<Output = Result<Vec<MediaItem>>> + Send;
    fn delete(&self, id: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Produces timed caption segments for a media item.
pub trait CaptionService {
    fn transcribe(&self, media_id: &str) -> impl Future<Output = Result<CaptionResult>> + Send;
}

/// Server-side project persistence.
pub trait ProjectStore {
    fn create(&self, record: &ProjectRecord) -> impl Future<Output = Result<StoredProject>> + Send;
    fn update(
        &self,
        id: &str,
        record: &ProjectRecord,
    ) -> impl Future<Output = Result<StoredProject>> + Send;
    fn fetch(&self, id: &str) -> impl Future<Output = Result<StoredProject>> + Send;
    fn list(&self) -> impl Future<Output = Result<Vec<StoredProject>>> + Send;
    fn delete(&self, id: &str) -> impl Future<Output = Result<()>> + Send;
}
