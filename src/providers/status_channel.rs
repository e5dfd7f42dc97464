//! Backend status channel.
//!
//! A background task keeps a WebSocket open to the backend and forwards
//! status frames to the session. Lost connections are retried with
//! exponential backoff; every connect/disconnect transition is reported so
//! the session can surface connectivity.

use futures_util::StreamExt;
use http::header::AUTHORIZATION;
use http::HeaderValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::config::ServiceConfig;
use crate::error::{EditorError, Result};

/// One status frame: `{"type": ..., "data": ..., "timestamp": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

impl StatusEvent {
    /// Reads a string field from `data`.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

/// What the channel reports to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelMessage {
    Connected,
    Disconnected { reason: String },
    Event(StatusEvent),
}

/// Handle to the background connection task.
#[derive(Debug)]
pub struct StatusChannel {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl StatusChannel {
    /// Spawns the connection loop. Messages arrive on the returned receiver.
    pub fn connect(config: &ServiceConfig) -> (Self, mpsc::UnboundedReceiver<ChannelMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = watch::channel(false);
        let options = LoopOptions {
            url: config.status_url.clone(),
            token: config.access_token.clone(),
            backoff_initial_ms: config.backoff_initial_ms.max(1),
            backoff_max_ms: config.backoff_max_ms.max(config.backoff_initial_ms.max(1)),
        };
        let task = tokio::spawn(run_loop(options, tx, shutdown_rx));
        (Self { shutdown, task }, rx)
    }

    /// Stops the loop and waits for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(err) = self.task.await {
            warn!(error = %err, "status channel task ended abnormally");
        }
    }
}

struct LoopOptions {
    url: String,
    token: Option<String>,
    backoff_initial_ms: u64,
    backoff_max_ms: u64,
}

/// Next retry delay: doubled, capped at `max_ms`.
pub fn next_backoff(current_ms: u64, max_ms: u64) -> u64 {
    current_ms.saturating_mul(2).min(max_ms)
}

/// Parses a text frame. Frames that are not status events are dropped.
pub fn parse_status_event(text: &str) -> Option<StatusEvent> {
    serde_json::from_str(text).ok()
}

/// Builds the handshake request, attaching the bearer token when present.
pub fn build_request(url: &str, token: Option<&str>) -> Result<Request> {
    let mut request = url.into_client_request()?;
    if let Some(token) = token.map(str::trim).filter(|token| !token.is_empty()) {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|err| EditorError::WebSocket(err.to_string()))?;
        request.headers_mut().insert(AUTHORIZATION, value);
    }
    Ok(request)
}

async fn run_loop(
    options: LoopOptions,
    tx: mpsc::UnboundedSender<ChannelMessage>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut backoff_ms = options.backoff_initial_ms;
    loop {
        if *shutdown.borrow() {
            break;
        }
        let request = match build_request(&options.url, options.token.as_deref()) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, url = %options.url, "invalid status channel url");
                let _ = tx.send(ChannelMessage::Disconnected {
                    reason: err.to_string(),
                });
                break;
            }
        };

        debug!(url = %options.url, "connecting status channel");
        match tokio_tungstenite::connect_async(request).await {
            Ok((mut socket, _)) => {
                backoff_ms = options.backoff_initial_ms;
                info!(url = %options.url, "status channel connected");
                if tx.send(ChannelMessage::Connected).is_err() {
                    break;
                }
                let reason = loop {
                    tokio::select! {
                        _ = shutdown.changed() => {
                            let _ = socket.close(None).await;
                            return;
                        }
                        frame = socket.next() => match frame {
                            Some(Ok(Message::Text(text))) => {
                                if let Some(event) = parse_status_event(&text) {
                                    if tx.send(ChannelMessage::Event(event)).is_err() {
                                        let _ = socket.close(None).await;
                                        return;
                                    }
                                }
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                break "connection closed".to_string()
                            }
                            Some(Ok(_)) => {}
                            Some(Err(err)) => break err.to_string(),
                        }
                    }
                };
                warn!(%reason, "status channel disconnected");
                if tx.send(ChannelMessage::Disconnected { reason }).is_err() {
                    break;
                }
            }
            Err(err) => {
                warn!(error = %err, backoff_ms, "status channel connect failed");
            }
        }

        tokio::select! {
            _ = shutdown.changed() => break,
            _ = tokio::time::sleep(Duration::from_millis(backoff_ms)) => {}
        }
        backoff_ms = next_backoff(backoff_ms, options.backoff_max_ms);
    }
    debug!("status channel stopped");
}
