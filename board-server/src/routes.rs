//! HTTP API for fetching and saving the board.
//!
//! - `GET /api/board` returns `{"canvasData": "..."}`, with `null` when no
//!   board has been saved yet.
//! - `PUT /api/board` validates and stores a new snapshot, returning
//!   `204 No Content` on success.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use board_core::Snapshot;

use crate::AppState;

/// Maximum accepted encoded snapshot size in bytes.
pub const MAX_SNAPSHOT_BYTES: usize = 8 * 1024 * 1024;

/// Board payload exchanged with clients.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPayload {
    /// Base64 PNG data URI of the board, `None` when blank.
    pub canvas_data: Option<String>,
}

/// Error body returned for rejected saves.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

/// `GET /api/board` handler.
#[tracing::instrument(name = "get_board", skip(state))]
pub async fn get_board(State(state): State<AppState>) -> Json<BoardPayload> {
    Json(BoardPayload {
        canvas_data: state.store.current(),
    })
}

/// `PUT /api/board` handler.
///
/// Rejects payloads that are missing, oversized, or not a decodable PNG
/// data URI; otherwise replaces the shared board and notifies the feed.
#[tracing::instrument(name = "put_board", skip(state, payload))]
pub async fn put_board(
    State(state): State<AppState>,
    Json(payload): Json<BoardPayload>,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    let canvas_data = payload.canvas_data.ok_or_else(|| {
        reject("missing_canvas_data", "canvasData must be a string".into())
    })?;

    if canvas_data.len() > MAX_SNAPSHOT_BYTES {
        return Err(reject(
            "snapshot_too_large",
            format!(
                "Encoded snapshot is {} bytes, limit is {MAX_SNAPSHOT_BYTES}",
                canvas_data.len()
            ),
        ));
    }

    if let Err(e) = Snapshot::from_data_uri(&canvas_data) {
        return Err(reject("invalid_snapshot", e.to_string()));
    }

    state.store.replace(canvas_data);
    Ok(StatusCode::NO_CONTENT)
}

fn reject(code: &str, message: String) -> (StatusCode, Json<ErrorBody>) {
    tracing::warn!(code, "Rejected board save: {message}");
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorBody {
            code: code.to_string(),
            message,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_camel_case_key() {
        let json = serde_json::to_string(&BoardPayload {
            canvas_data: Some("data:image/png;base64,AAAA".into()),
        })
        .expect("serializes");
        assert!(json.contains("\"canvasData\""));

        let empty = serde_json::to_string(&BoardPayload { canvas_data: None }).expect("serializes");
        assert_eq!(empty, "{\"canvasData\":null}");
    }

    #[test]
    fn payload_round_trips() {
        let parsed: BoardPayload =
            serde_json::from_str("{\"canvasData\":\"data:image/png;base64,AAAA\"}")
                .expect("parses");
        assert_eq!(
            parsed.canvas_data.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }
}
