//! WebSocket change-notification feed.
//!
//! Every connected client receives a `board_update` whenever any client
//! saves, including the writer itself (clients suppress their own echo).
//!
//! ## Message Protocol
//!
//! ### Client -> Server
//!
//! - `{"type": "save", "canvasData": "data:image/png;base64,..."}`
//! - `{"type": "ping"}`
//!
//! ### Server -> Client
//!
//! - `{"type": "welcome", "version": "...", "canvasData": ..., "timestamp": ...}`
//! - `{"type": "board_update", "canvasData": "...", "timestamp": ...}`
//! - `{"type": "pong", "timestamp": ...}`
//! - `{"type": "error", "code": "save_throttled" | "message_too_large" |
//!   "invalid_snapshot" | "parse_error", "message": "..."}`

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use board_core::Snapshot;

use crate::routes::MAX_SNAPSHOT_BYTES;
use crate::store::BoardStore;

/// Default minimum spacing between accepted saves, in milliseconds.
const DEFAULT_SAVE_MIN_INTERVAL_MS: u64 = 250;

/// Per-connection spacing guard for save messages.
///
/// Clients debounce saves locally (roughly one per second of quiet drawing),
/// so a healthy connection never trips this. It caps how fast a broken or
/// hostile client can push full-frame snapshots through the feed. Pings and
/// malformed messages are cheap and are not throttled.
pub struct SaveThrottle {
    min_interval: Duration,
    last_accepted: Option<Instant>,
}

impl SaveThrottle {
    /// Create a throttle enforcing `min_interval` between accepted saves.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: None,
        }
    }

    /// Create a throttle from the environment or the default.
    ///
    /// - `BOARD_SAVE_MIN_INTERVAL_MS`: minimum gap between accepted saves on
    ///   one connection (default: 250)
    #[must_use]
    pub fn from_env() -> Self {
        let ms = std::env::var("BOARD_SAVE_MIN_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SAVE_MIN_INTERVAL_MS);
        Self::new(Duration::from_millis(ms))
    }

    /// Admit a save arriving at `now`, recording it, or reject it as too
    /// soon after the last accepted one. Rejected saves do not move the
    /// window.
    pub fn admit(&mut self, now: Instant) -> bool {
        let allowed = self
            .last_accepted
            .map_or(true, |last| now.duration_since(last) >= self.min_interval);
        if allowed {
            self.last_accepted = Some(now);
        }
        allowed
    }

    /// Time from `now` until the next save would be admitted.
    #[must_use]
    pub fn retry_after(&self, now: Instant) -> Duration {
        self.last_accepted.map_or(Duration::ZERO, |last| {
            (last + self.min_interval).saturating_duration_since(now)
        })
    }
}

/// Client-to-server WebSocket message types.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Save a new board snapshot.
    Save {
        /// Base64 PNG data URI of the board.
        #[serde(rename = "canvasData")]
        canvas_data: String,
    },
    /// Ping to keep the connection alive.
    Ping,
}

/// Server-to-client WebSocket message types.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Welcome message on connection, carrying the current board.
    Welcome {
        /// Server version.
        version: String,
        /// Current board snapshot, `None` when blank.
        #[serde(rename = "canvasData")]
        canvas_data: Option<String>,
        /// Connection timestamp.
        timestamp: u64,
    },
    /// The board was replaced by some client.
    BoardUpdate {
        /// The new snapshot.
        #[serde(rename = "canvasData")]
        canvas_data: String,
        /// Event timestamp.
        timestamp: u64,
    },
    /// Pong response to ping.
    Pong {
        /// Response timestamp.
        timestamp: u64,
    },
    /// Error response.
    Error {
        /// Error code.
        code: String,
        /// Human-readable error message.
        message: String,
    },
}

/// Current Unix timestamp in milliseconds.
#[must_use]
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

/// Drive one WebSocket connection until it closes.
///
/// Sends a welcome with the current board, then relays saves into the store
/// and fans board updates back out from the broadcast channel.
pub async fn handle_board_socket(socket: WebSocket, store: BoardStore) {
    let (mut sender, mut receiver) = socket.split();

    let peer_id = Uuid::new_v4().to_string();
    let mut throttle = SaveThrottle::from_env();
    let mut updates = store.subscribe();

    let welcome = ServerMessage::Welcome {
        version: env!("CARGO_PKG_VERSION").to_string(),
        canvas_data: store.current(),
        timestamp: current_timestamp(),
    };
    match serde_json::to_string(&welcome) {
        Ok(json) => {
            if sender.send(Message::Text(json.into())).await.is_err() {
                return;
            }
        }
        Err(e) => {
            tracing::error!(peer_id = %peer_id, "Failed to serialize welcome message: {e}");
            return;
        }
    }

    tracing::info!(peer_id = %peer_id, "Board feed client connected");

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if text.len() > MAX_SNAPSHOT_BYTES {
                            tracing::warn!(peer_id = %peer_id, "Oversized message rejected");
                            let error = ServerMessage::Error {
                                code: "message_too_large".to_string(),
                                message: format!("Message exceeds {MAX_SNAPSHOT_BYTES} bytes"),
                            };
                            if send_message(&mut sender, &error).await.is_err() {
                                break;
                            }
                            continue;
                        }

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Save { canvas_data }) => {
                                let now = Instant::now();
                                if !throttle.admit(now) {
                                    let retry_after = throttle.retry_after(now).as_millis() as u64;
                                    tracing::warn!(peer_id = %peer_id, "Save throttled");
                                    let error = ServerMessage::Error {
                                        code: "save_throttled".to_string(),
                                        message: format!(
                                            "Saving too fast. Retry after {retry_after}ms"
                                        ),
                                    };
                                    if send_message(&mut sender, &error).await.is_err() {
                                        break;
                                    }
                                    continue;
                                }

                                if let Err(e) = Snapshot::from_data_uri(&canvas_data) {
                                    tracing::warn!(peer_id = %peer_id, "Invalid snapshot rejected: {e}");
                                    let error = ServerMessage::Error {
                                        code: "invalid_snapshot".to_string(),
                                        message: e.to_string(),
                                    };
                                    if send_message(&mut sender, &error).await.is_err() {
                                        break;
                                    }
                                    continue;
                                }

                                tracing::debug!(peer_id = %peer_id, "Accepted board save");
                                store.replace(canvas_data);
                            }
                            Ok(ClientMessage::Ping) => {
                                let pong = ServerMessage::Pong {
                                    timestamp: current_timestamp(),
                                };
                                if send_message(&mut sender, &pong).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                let error = ServerMessage::Error {
                                    code: "parse_error".to_string(),
                                    message: e.to_string(),
                                };
                                if send_message(&mut sender, &error).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!(peer_id = %peer_id, "Board feed client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::error!(peer_id = %peer_id, "WebSocket error: {e}");
                        break;
                    }
                    None => break,
                    _ => {}
                }
            }
            update = updates.recv() => {
                match update {
                    Ok(update) => {
                        let message = ServerMessage::BoardUpdate {
                            canvas_data: update.canvas_data,
                            timestamp: current_timestamp(),
                        };
                        if send_message(&mut sender, &message).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Only the latest board matters; resend it.
                        tracing::warn!(peer_id = %peer_id, skipped, "Feed lagged, resyncing");
                        if let Some(canvas_data) = store.current() {
                            let message = ServerMessage::BoardUpdate {
                                canvas_data,
                                timestamp: current_timestamp(),
                            };
                            if send_message(&mut sender, &message).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!(peer_id = %peer_id, "Board feed connection closed");
}

async fn send_message(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), ()> {
    let json = serde_json::to_string(message).map_err(|e| {
        tracing::error!("Failed to serialize server message: {e}");
    })?;
    sender.send(Message::Text(json.into())).await.map_err(|_| ())
}
