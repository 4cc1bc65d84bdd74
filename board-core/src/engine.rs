//! The whiteboard engine: stroke capture, history, and the save pipeline.
//!
//! One engine instance owns the surface for the lifetime of the view. The
//! whole engine runs on a single logical thread of control: input events, the
//! debounce deadline, and remote notifications are all fed in by the host, so
//! the self-echo flag is an ordinary `bool` and nothing needs a lock. Time is
//! host-supplied as well: every commit and poll takes `now`, which keeps the
//! pipeline deterministic under test.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::cache::{LocalCache, BOARD_CACHE_KEY};
use crate::debounce::{SaveDebouncer, DEFAULT_SAVE_DEBOUNCE};
use crate::error::BoardResult;
use crate::history::{History, UndoStep};
use crate::input::{PointerEvent, PointerPhase};
use crate::snapshot::Snapshot;
use crate::stroke::StrokeStyle;
use crate::surface::{Point, Surface};

/// Default surface width in pixels.
const DEFAULT_WIDTH: u32 = 800;

/// Default surface height in pixels.
const DEFAULT_HEIGHT: u32 = 600;

/// Connection status to the remote store, surfaced to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Notification feed established.
    Connected,
    /// Attempting to connect.
    Connecting,
    /// Disconnected; drawing continues local-only.
    Offline,
}

/// Engine construction parameters.
#[derive(Debug)]
pub struct EngineConfig {
    /// Initial surface width in pixels.
    pub width: u32,
    /// Initial surface height in pixels.
    pub height: u32,
    /// Quiet period before a committed change is handed off for saving.
    pub save_debounce: Duration,
    /// Optional local fallback cache.
    pub cache: Option<LocalCache>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            save_debounce: DEFAULT_SAVE_DEBOUNCE,
            cache: None,
        }
    }
}

/// An in-progress stroke: its style and the last painted point.
#[derive(Debug)]
struct ActiveStroke {
    style: StrokeStyle,
    last: Point,
}

/// The whiteboard canvas engine.
pub struct BoardEngine {
    surface: Surface,
    history: History,
    active: Option<ActiveStroke>,
    debouncer: SaveDebouncer,
    /// Set immediately before a save payload is handed off; the next incoming
    /// change notification is ours and must not be reapplied.
    expect_self_echo: bool,
    cache: Option<LocalCache>,
    connection: ConnectionStatus,
}

impl BoardEngine {
    /// Create an engine with a blank surface and empty history.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            surface: Surface::new(config.width, config.height),
            history: History::new(),
            active: None,
            debouncer: SaveDebouncer::new(config.save_debounce),
            expect_self_echo: false,
            cache: config.cache,
            connection: ConnectionStatus::Connecting,
        }
    }

    // -----------------------------------------------------------------------
    // Load-time baseline
    // -----------------------------------------------------------------------

    /// Seed the engine from a successful remote fetch.
    ///
    /// `remote` is what the reachable store returned: `Some` seeds the
    /// surface and history entry 0 from it, `None` (the store holds no board
    /// yet) starts blank. The local cache is deliberately not consulted here;
    /// while the remote is reachable it is the authoritative baseline, and a
    /// stale cache must not resurrect a board the store no longer has. A
    /// payload that does not decode is treated as a failed fetch and falls
    /// back via [`BoardEngine::initialize_offline`]. Seeding never schedules
    /// a save.
    pub fn initialize(&mut self, remote: Option<&str>) {
        match remote {
            Some(encoded) => match Snapshot::from_data_uri(encoded) {
                Ok(snapshot) => {
                    self.seed(&snapshot);
                    tracing::debug!("Seeded board from remote snapshot");
                }
                Err(e) => {
                    tracing::warn!("Remote snapshot undecodable, treating fetch as failed: {e}");
                    self.initialize_offline();
                }
            },
            None => {
                tracing::debug!("Remote board is empty, starting blank");
            }
        }
    }

    /// Seed the engine when the remote fetch failed.
    ///
    /// Falls back to the local cache of the last successfully saved snapshot,
    /// and to a blank surface when no usable cache entry exists. Seeding
    /// never schedules a save.
    pub fn initialize_offline(&mut self) {
        let cached = self
            .cache
            .as_ref()
            .and_then(|cache| cache.read(BOARD_CACHE_KEY));
        if let Some(encoded) = cached {
            match Snapshot::from_data_uri(&encoded) {
                Ok(snapshot) => {
                    self.seed(&snapshot);
                    tracing::debug!("Seeded board from local cache");
                    return;
                }
                Err(e) => {
                    tracing::warn!("Cached snapshot undecodable, starting blank: {e}");
                }
            }
        }

        tracing::debug!("Starting from a blank board");
    }

    fn seed(&mut self, snapshot: &Snapshot) {
        self.surface.restore(snapshot);
        self.history.commit(self.surface.snapshot());
    }

    // -----------------------------------------------------------------------
    // Stroke capture
    // -----------------------------------------------------------------------

    /// Begin a stroke at `point`.
    ///
    /// Paints the starting dot immediately (round caps make a zero-length
    /// segment a visible circle of the stroke width's diameter). Ignored if a
    /// stroke is already active.
    pub fn begin_stroke(&mut self, point: Point, style: StrokeStyle) {
        if self.active.is_some() {
            tracing::debug!("begin_stroke while a stroke is active, ignoring");
            return;
        }
        self.surface.draw_segment(point, point, &style);
        self.active = Some(ActiveStroke { style, last: point });
    }

    /// Extend the active stroke to `point`. No-op when no stroke is active.
    pub fn extend_stroke(&mut self, point: Point) {
        if let Some(active) = &mut self.active {
            let from = active.last;
            let style = active.style;
            active.last = point;
            self.surface.draw_segment(from, point, &style);
        }
    }

    /// Complete the active stroke: snapshot the surface, commit it to
    /// history, and arm the save pipeline at `now`. No-op when no stroke is
    /// active.
    pub fn end_stroke(&mut self, now: Instant) {
        if self.active.take().is_some() {
            self.commit_surface(now);
        }
    }

    /// Drive the engine with a pointer event in viewport coordinates.
    ///
    /// `origin` is the surface's on-screen offset; `style` applies when this
    /// event begins a stroke; `now` stamps a completing stroke's commit.
    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        origin: Point,
        style: StrokeStyle,
        now: Instant,
    ) {
        let point = event.to_surface(origin);
        match event.phase {
            PointerPhase::Start => self.begin_stroke(point, style),
            PointerPhase::Move => self.extend_stroke(point),
            PointerPhase::End | PointerPhase::Cancel => self.end_stroke(now),
        }
    }

    // -----------------------------------------------------------------------
    // History navigation
    // -----------------------------------------------------------------------

    /// Step back one committed state.
    ///
    /// Undoing the first entry blanks the surface without growing history;
    /// a redo can still bring the entry back.
    pub fn undo(&mut self) {
        match self.history.undo() {
            UndoStep::Repaint(snapshot) => {
                let snapshot = snapshot.clone();
                self.surface.restore(&snapshot);
            }
            UndoStep::Blank => self.surface.clear(),
            UndoStep::Noop => {}
        }
    }

    /// Step forward one committed state, if a redo is available.
    pub fn redo(&mut self) {
        if let Some(snapshot) = self.history.redo() {
            let snapshot = snapshot.clone();
            self.surface.restore(&snapshot);
        }
    }

    /// Blank the surface and commit the blank state as a new entry, so the
    /// clear is itself undoable. Also updates the local cache and arms the
    /// save pipeline at `now`.
    pub fn clear(&mut self, now: Instant) {
        self.active = None;
        self.surface.clear();
        self.commit_surface(now);
        self.write_cache();
    }

    // -----------------------------------------------------------------------
    // Save pipeline and remote reconciliation
    // -----------------------------------------------------------------------

    /// Collect a due save payload.
    ///
    /// When the debounce deadline has passed this encodes the current
    /// surface, updates the local cache, sets the self-echo flag, and hands
    /// the payload to the host for the actual (asynchronous) send. Returns
    /// `None` while no save is due. Encoding failures are logged and drop
    /// the save; the cache and surface are untouched by the failure.
    pub fn poll_save(&mut self, now: Instant) -> Option<String> {
        if !self.debouncer.fire_due(now) {
            return None;
        }
        let encoded = match self.surface.snapshot().to_data_uri() {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!("Skipping save, snapshot encoding failed: {e}");
                return None;
            }
        };
        if let Some(cache) = &self.cache {
            cache.write(BOARD_CACHE_KEY, &encoded);
        }
        self.expect_self_echo = true;
        Some(encoded)
    }

    /// Whether a save is armed and waiting for its quiet period.
    #[must_use]
    pub fn save_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Time remaining until the armed save is due, for host sleep sizing.
    #[must_use]
    pub fn next_save_due(&self, now: Instant) -> Option<Duration> {
        self.debouncer.time_until_due(now)
    }

    /// Apply an incoming change notification from the remote store.
    ///
    /// A notification marked by the self-echo flag is ours: it is skipped and
    /// the flag cleared, returning `Ok(false)`. A genuine remote change is
    /// decoded, painted, and committed as a new history entry so it joins
    /// the local undo timeline, returning `Ok(true)`. Remote applies never
    /// arm the save pipeline (that would echo the echo).
    ///
    /// # Errors
    ///
    /// Returns [`crate::BoardError::InvalidSnapshot`] if the payload does not
    /// decode; the surface and history are left untouched.
    pub fn apply_remote(&mut self, encoded: &str) -> BoardResult<bool> {
        if self.expect_self_echo {
            self.expect_self_echo = false;
            tracing::debug!("Skipping self-originated change notification");
            return Ok(false);
        }
        let snapshot = Snapshot::from_data_uri(encoded)?;
        self.surface.restore(&snapshot);
        self.history.commit(self.surface.snapshot());
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Layout and export
    // -----------------------------------------------------------------------

    /// Resize the surface to a new container size, repainting from the
    /// current history entry so the undo/redo position survives the layout
    /// change. Never arms the save pipeline.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
        if let Some(snapshot) = self.history.current() {
            let snapshot = snapshot.clone();
            self.surface.restore(&snapshot);
        }
    }

    /// Encode the current surface as PNG bytes for a one-shot download.
    /// Touches neither history nor the save pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BoardError::Encode`] if PNG encoding fails.
    pub fn export_png(&self) -> BoardResult<Vec<u8>> {
        self.surface.snapshot().to_png()
    }

    // -----------------------------------------------------------------------
    // State accessors
    // -----------------------------------------------------------------------

    /// The drawing surface.
    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Number of committed history entries.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// History cursor; `None` when the surface shows no committed state.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.history.cursor()
    }

    /// Whether an undo would change the displayed state.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether a redo would change the displayed state.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Current connection status.
    #[must_use]
    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    /// Record a connection status change reported by the host.
    pub fn set_connection(&mut self, status: ConnectionStatus) {
        if status == ConnectionStatus::Connected && self.connection != ConnectionStatus::Connected {
            tracing::info!("Board notification feed connected");
        }
        self.connection = status;
    }

    fn commit_surface(&mut self, now: Instant) {
        self.history.commit(self.surface.snapshot());
        self.debouncer.schedule(now);
    }

    fn write_cache(&self) {
        let Some(cache) = &self.cache else {
            return;
        };
        match self.surface.snapshot().to_data_uri() {
            Ok(encoded) => cache.write(BOARD_CACHE_KEY, &encoded),
            Err(e) => tracing::warn!("Skipping cache write, encoding failed: {e}"),
        }
    }
}
