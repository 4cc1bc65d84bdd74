//! Shared board state with change notifications.
//!
//! Holds the single current snapshot behind an `RwLock` and fans out every
//! replacement over a broadcast channel to the WebSocket feed. Writes are
//! last-write-wins; the store keeps no history of its own (clients own their
//! undo timelines).

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;

/// Filename for the persisted snapshot inside the data directory.
const SNAPSHOT_FILE: &str = "board.snapshot";

/// Capacity of the update broadcast channel.
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// A board replacement event fanned out to connected clients.
///
/// Carries only the snapshot: the feed delivers every replacement to every
/// client, writers included, and each client filters its own echo locally.
#[derive(Debug, Clone)]
pub struct BoardUpdate {
    /// The new encoded snapshot.
    pub canvas_data: String,
}

/// Thread-safe store of the single shared board snapshot.
#[derive(Clone)]
pub struct BoardStore {
    current: Arc<RwLock<Option<String>>>,
    data_dir: Option<PathBuf>,
    update_tx: broadcast::Sender<BoardUpdate>,
}

impl BoardStore {
    /// Create an in-memory store with no persistence.
    #[must_use]
    pub fn new() -> Self {
        let (update_tx, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            current: Arc::new(RwLock::new(None)),
            data_dir: None,
            update_tx,
        }
    }

    /// Create a store persisted under `data_dir`.
    ///
    /// The directory is created if needed and any previously persisted
    /// snapshot is loaded as the current board.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;

        let path = data_dir.join(SNAPSHOT_FILE);
        let current = match std::fs::read_to_string(&path) {
            Ok(encoded) => {
                tracing::info!(path = %path.display(), "Loaded persisted board snapshot");
                Some(encoded)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to load persisted snapshot: {e}");
                None
            }
        };

        let (update_tx, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Ok(Self {
            current: Arc::new(RwLock::new(current)),
            data_dir: Some(data_dir),
            update_tx,
        })
    }

    /// The current encoded snapshot, if any board has been saved.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the board with a new snapshot, persist it, and notify
    /// subscribers.
    ///
    /// Persistence failures are logged and do not block the replacement;
    /// clients keep working from the in-memory copy.
    pub fn replace(&self, canvas_data: String) {
        {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            *current = Some(canvas_data.clone());
        }

        if let Some(data_dir) = &self.data_dir {
            let path = data_dir.join(SNAPSHOT_FILE);
            if let Err(e) = std::fs::write(&path, &canvas_data) {
                tracing::warn!(path = %path.display(), "Failed to persist board snapshot: {e}");
            }
        }

        tracing::debug!(bytes = canvas_data.len(), "Board snapshot replaced");

        // No receivers is fine (nobody connected yet).
        let _ = self.update_tx.send(BoardUpdate { canvas_data });
    }

    /// Subscribe to board replacement events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BoardUpdate> {
        self.update_tx.subscribe()
    }

    /// Number of feed subscribers currently connected.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.update_tx.receiver_count()
    }

    /// Persistence directory, `None` for an in-memory store.
    #[must_use]
    pub fn data_dir(&self) -> Option<&std::path::Path> {
        self.data_dir.as_deref()
    }
}

impl Default for BoardStore {
    fn default() -> Self {
        Self::new()
    }
}
