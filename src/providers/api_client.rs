use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use super::{CaptionService, MediaIngestion, ProjectStore};
use crate::config::ServiceConfig;
use crate::constants::MAX_UPLOAD_BYTES;
use crate::error::{EditorError, Result};
use crate::state::{
    CaptionResult, MediaItem, MediaKind, MediaMetadata, ProjectRecord, TracksData,
};

/// HTTP client for the editor backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

/// File record returned by the media routes.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaFileResponse {
    pub id: String,
    #[serde(default)]
    pub filename: String,
    pub file_type: String,
    #[serde(default)]
    pub original_filename: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub duration: Option<f64>,
    pub file_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    success: bool,
    #[serde(default)]
    message: String,
    file: Option<MediaFileResponse>,
}

#[derive(Debug, Serialize)]
struct TranscriptionRequest<'a> {
    media_file_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    success: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    transcription: Option<CaptionResult>,
}

/// A project as returned by the project routes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredProject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub fps: Option<u32>,
    #[serde(default)]
    pub resolution_width: Option<u32>,
    #[serde(default)]
    pub resolution_height: Option<u32>,
    #[serde(default)]
    pub tracks_data: Option<TracksData>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl StoredProject {
    /// The stored project as a record, with backend defaults for missing fields.
    pub fn into_record(self) -> ProjectRecord {
        ProjectRecord {
            name: self.name,
            duration: self.duration.unwrap_or(0.0),
            fps: self.fps.unwrap_or(crate::constants::DEFAULT_FPS as u32),
            resolution_width: self
                .resolution_width
                .unwrap_or(crate::constants::DEFAULT_RESOLUTION_WIDTH),
            resolution_height: self
                .resolution_height
                .unwrap_or(crate::constants::DEFAULT_RESOLUTION_HEIGHT),
            tracks_data: self.tracks_data.unwrap_or_default(),
        }
    }
}

impl ApiClient {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            access_token: config
                .access_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Uploads a media file after checking its type and size locally.
    pub async fn upload_media(&self, path: &Path) -> Result<MediaItem> {
        let kind = MediaKind::from_path(path).ok_or_else(|| EditorError::UnsupportedMedia {
            path: path.to_path_buf(),
        })?;
        let size = tokio::fs::metadata(path).await?.len();
        if size > MAX_UPLOAD_BYTES {
            return Err(EditorError::FileTooLarge {
                size,
                limit: MAX_UPLOAD_BYTES,
            });
        }
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();
        let mime = MediaKind::mime_for(path);
        let part = Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str(mime.as_ref())?;
        let form = Form::new().part("file", part);

        debug!(file = %file_name, size, ?kind, "uploading media");
        let response = self
            .authorized(self.client.post(self.url("/media/upload")))
            .multipart(form)
            .send()
            .await?;
        let payload: UploadResponse = read_json(response).await?;
        let file = match payload.file {
            Some(file) if payload.success => file,
            _ => {
                return Err(EditorError::Service {
                    status: StatusCode::OK.as_u16(),
                    message: payload.message,
                })
            }
        };
        let item = media_item_from_response(&self.base_url, file);
        info!(media_id = %item.id, kind = ?item.kind, "media uploaded");
        Ok(item)
    }

    pub async fn get_media(&self, id: &str) -> Result<MediaItem> {
        let response = self
            .authorized(self.client.get(self.media_url(id)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(EditorError::MediaNotFound(id.to_string()));
        }
        let file: MediaFileResponse = read_json(response).await?;
        Ok(media_item_from_response(&self.base_url, file))
    }

    /// Every media item owned by the caller.
    pub async fn list_media(&self) -> Result<Vec<MediaItem>> {
        let response = self
            .authorized(self.client.get(self.url("/media/")))
            .send()
            .await?;
        let files: Vec<MediaFileResponse> = read_json(response).await?;
        debug!(count = files.len(), "media listed");
        Ok(files
            .into_iter()
            .map(|file| media_item_from_response(&self.base_url, file))
            .collect())
    }

    pub async fn delete_media(&self, id: &str) -> Result<()> {
        let response = self
            .authorized(self.client.delete(self.media_url(id)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(EditorError::MediaNotFound(id.to_string()));
        }
        let _: Value = read_json(response).await?;
        info!(media_id = %id, "media deleted");
        Ok(())
    }

    fn media_url(&self, id: &str) -> String {
        self.url(&format!("/media/{}", urlencoding::encode(id)))
    }

    /// Runs a transcription for an ingested media item.
    pub async fn transcribe_media(&self, media_id: &str) -> Result<CaptionResult> {
        let response = self
            .authorized(self.client.post(self.url("/transcription/transcribe")))
            .json(&TranscriptionRequest {
                media_file_id: media_id,
            })
            .send()
            .await?;
        let payload: TranscriptionResponse = read_json(response).await?;
        match payload.transcription {
            Some(result) if payload.success => Ok(result),
            _ => Err(EditorError::Service {
                status: StatusCode::OK.as_u16(),
                message: if payload.message.is_empty() {
                    "transcription returned no result".to_string()
                } else {
                    payload.message
                },
            }),
        }
    }

    pub async fn create_project(&self, record: &ProjectRecord) -> Result<StoredProject> {
        let response = self
            .authorized(self.client.post(self.url("/projects/")))
            .json(record)
            .send()
            .await?;
        let stored: StoredProject = read_json(response).await?;
        info!(project_id = %stored.id, "project created");
        Ok(stored)
    }

    pub async fn update_project(&self, id: &str, record: &ProjectRecord) -> Result<StoredProject> {
        let response = self
            .authorized(self.client.put(self.project_url(id)))
            .json(record)
            .send()
            .await?;
        let stored = read_project(response, id).await?;
        info!(project_id = %id, "project saved");
        Ok(stored)
    }

    pub async fn get_project(&self, id: &str) -> Result<StoredProject> {
        let response = self
            .authorized(self.client.get(self.project_url(id)))
            .send()
            .await?;
        read_project(response, id).await
    }

    pub async fn list_projects(&self) -> Result<Vec<StoredProject>> {
        let response = self
            .authorized(self.client.get(self.url("/projects/")))
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn delete_project(&self, id: &str) -> Result<()> {
        let response = self
            .authorized(self.client.delete(self.project_url(id)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(EditorError::ProjectNotFound(id.to_string()));
        }
        let _: Value = read_json(response).await?;
        info!(project_id = %id, "project deleted");
        Ok(())
    }

    fn project_url(&self, id: &str) -> String {
        self.url(&format!("/projects/{}", urlencoding::encode(id)))
    }
}

impl MediaIngestion for ApiClient {
    async fn upload(&self, path: &Path) -> Result<MediaItem> {
        self.upload_media(path).await
    }

    async fn fetch(&self, id: &str) -> Result<MediaItem> {
        self.get_media(id).await
    }

    async fn list(&self) -> Result<Vec<MediaItem>> {
        self.list_media().await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.delete_media(id).await
    }
}

impl CaptionService for ApiClient {
    async fn transcribe(&self, media_id: &str) -> Result<CaptionResult> {
        self.transcribe_media(media_id).await
    }
}

impl ProjectStore for ApiClient {
    async fn create(&self, record: &ProjectRecord) -> Result<StoredProject> {
        self.create_project(record).await
    }

    async fn update(&self, id: &str, record: &ProjectRecord) -> Result<StoredProject> {
        self.update_project(id, record).await
    }

    async fn fetch(&self, id: &str) -> Result<StoredProject> {
        self.get_project(id).await
    }

    async fn list(&self) -> Result<Vec<StoredProject>> {
        self.list_projects().await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.delete_project(id).await
    }
}

async fn read_project(response: Response, id: &str) -> Result<StoredProject> {
    if response.status() == StatusCode::NOT_FOUND {
        return Err(EditorError::ProjectNotFound(id.to_string()));
    }
    read_json(response).await
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let message = error_message(&body);
        warn!(status = status.as_u16(), %message, "backend request failed");
        return Err(EditorError::Service {
            status: status.as_u16(),
            message,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

/// Extracts a readable message from an error body (`{"detail": ...}` or plain text).
fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let detail = parsed.as_ref().and_then(|value| {
        value
            .get("detail")
            .or_else(|| value.get("message"))
            .map(|detail| match detail {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
    });
    detail.unwrap_or_else(|| body.trim().to_string())
}

/// Turns a stored file path into a URL the preview surface can load.
pub fn resolve_media_url(base_url: &str, file_url: &str) -> String {
    if file_url.starts_with("http://") || file_url.starts_with("https://") {
        return file_url.to_string();
    }
    if file_url.is_empty() {
        return String::new();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        file_url.trim_start_matches("./").trim_start_matches('/')
    )
}

/// Converts an upload response into a media item.
pub fn media_item_from_response(base_url: &str, file: MediaFileResponse) -> MediaItem {
    let kind = match file.file_type.as_str() {
        "video" => Some(MediaKind::Video),
        "audio" => Some(MediaKind::Audio),
        "image" => Some(MediaKind::Image),
        _ => None,
    }
    .or_else(|| MediaKind::from_path(Path::new(&file.original_filename)))
    .unwrap_or(MediaKind::Video);

    let metadata: MediaMetadata = file
        .metadata
        .clone()
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default();
    let duration_seconds = file.duration.or_else(|| {
        file.metadata
            .as_ref()
            .and_then(|value| value.get("duration"))
            .and_then(Value::as_f64)
    });
    let name = if file.original_filename.is_empty() {
        file.filename
    } else {
        file.original_filename
    };

    MediaItem {
        id: file.id,
        kind,
        name,
        duration_seconds,
        thumbnail_ref: file
            .thumbnail_url
            .filter(|url| !url.is_empty())
            .map(|url| resolve_media_url(base_url, &url)),
        playable_ref: resolve_media_url(base_url, &file.file_url),
        metadata,
    }
}
