//! # Board Core
//!
//! The whiteboard canvas engine: a raster drawing surface with snapshot-based
//! undo/redo and a debounced save pipeline that keeps a shared remote snapshot
//! eventually consistent with local edits.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 board-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Surface         │  Stroke Capture          │
//! │  - RGBA raster   │  - Pen / eraser          │
//! │  - Round caps    │  - Pointer & touch       │
//! ├─────────────────────────────────────────────┤
//! │  History         │  Save Pipeline           │
//! │  - Snapshots     │  - Trailing debounce     │
//! │  - Branch prune  │  - Self-echo suppression │
//! │                  │  - Local fallback cache  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The engine performs no I/O of its own: a host drives it with input events,
//! collects due save payloads via [`BoardEngine::poll_save`], and feeds remote
//! change notifications back in via [`BoardEngine::apply_remote`]. All state
//! lives on one logical thread of control, so there are no locks anywhere.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod history;
pub mod input;
pub mod snapshot;
pub mod stroke;
pub mod surface;

pub use cache::{LocalCache, BOARD_CACHE_KEY};
pub use debounce::SaveDebouncer;
pub use engine::{BoardEngine, ConnectionStatus, EngineConfig};
pub use error::{BoardError, BoardResult};
pub use history::{History, UndoStep};
pub use input::{PointerEvent, PointerPhase, TouchInput, TouchPoint};
pub use snapshot::Snapshot;
pub use stroke::{Color, StrokeStyle, Tool, MIN_STROKE_WIDTH};
pub use surface::{Point, Surface};

/// Engine crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
