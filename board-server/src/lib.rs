//! # Whiteboard Server Library
//!
//! Shared state, routes, and the WebSocket feed for the whiteboard server.
//! Used by both the binary and integration tests.

use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::IntoResponse,
    routing::get,
    Router,
};

pub mod health;
pub mod routes;
pub mod store;
pub mod sync;

pub use store::{BoardStore, BoardUpdate};
pub use sync::{handle_board_socket, ClientMessage, ServerMessage};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The single shared board.
    pub store: BoardStore,
}

impl AppState {
    /// Create application state around a board store.
    #[must_use]
    pub fn new(store: BoardStore) -> Self {
        Self { store }
    }
}

/// Build the application router.
///
/// Transport-level layers (CORS, tracing) are added by the caller.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/ws", get(websocket_handler))
        .route(
            "/api/board",
            get(routes::get_board).put(routes::put_board),
        )
        .with_state(state)
}

/// WebSocket upgrade handler for the board feed.
#[tracing::instrument(name = "websocket_connect", skip(ws, state))]
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    tracing::info!("WebSocket connection upgrade requested");
    ws.on_upgrade(move |socket| handle_board_socket(socket, state.store))
}
