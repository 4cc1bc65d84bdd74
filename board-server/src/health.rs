//! Health probes.
//!
//! - `/health/live` - liveness probe (restart if fails)
//! - `/health/ready` - readiness probe (remove from LB if fails)

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Readiness report for the board server.
#[derive(Debug, Serialize)]
pub struct ReadinessReport {
    /// "ready", or "degraded" when the persistence directory is gone.
    pub status: &'static str,
    /// Server version.
    pub version: &'static str,
    /// Whether any board has been saved yet.
    pub board_saved: bool,
    /// Feed clients currently connected.
    pub feed_clients: usize,
    /// Where snapshots go: "disk", "memory", or "missing" when the
    /// configured data directory has disappeared.
    pub persistence: &'static str,
}

/// Liveness probe.
///
/// Returns 200 OK if the process is alive.
#[tracing::instrument(name = "liveness_probe")]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe.
///
/// Exercises the store lock and reports the persistence mode. A configured
/// data directory that no longer exists degrades readiness: saves would
/// silently stop surviving restarts.
#[tracing::instrument(name = "readiness_probe", skip(state))]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessReport>) {
    let persistence = match state.store.data_dir() {
        None => "memory",
        Some(dir) if dir.is_dir() => "disk",
        Some(_) => "missing",
    };
    let ready = persistence != "missing";

    let report = ReadinessReport {
        status: if ready { "ready" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        board_saved: state.store.current().is_some(),
        feed_clients: state.store.subscriber_count(),
        persistence,
    };

    let code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(report))
}
