//! Trailing-edge debounce for the save pipeline.
//!
//! Strokes generate many commits per second; saving on every commit would
//! flood the backend. Each commit (re)arms a single deadline and only the
//! state present when the deadline passes is ever sent. Plain `Instant`
//! arithmetic, no timer thread: the host polls.

use std::time::{Duration, Instant};

/// Default quiet period before a save fires.
pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Coalesces bursts of commits into one save.
#[derive(Debug)]
pub struct SaveDebouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl SaveDebouncer {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arm (or re-arm) the deadline at `now + delay`.
    ///
    /// A pending deadline is superseded, never stacked, so only the trailing
    /// commit within a burst fires.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Whether a save is armed and has not fired yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time remaining until the deadline, if one is armed.
    ///
    /// Returns `Duration::ZERO` when the deadline has already passed. Hosts
    /// use this to size their sleep between polls.
    #[must_use]
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Consume the deadline if it has passed.
    ///
    /// Returns `true` exactly once per armed deadline.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Disarm without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn does_not_fire_before_deadline() {
        let t0 = Instant::now();
        let mut debouncer = SaveDebouncer::new(Duration::from_millis(1000));

        debouncer.schedule(t0);
        assert!(debouncer.is_pending());
        assert!(!debouncer.fire_due(t0));
        assert!(!debouncer.fire_due(t0 + Duration::from_millis(999)));
    }

    #[test]
    fn fires_exactly_once_after_deadline() {
        let t0 = Instant::now();
        let mut debouncer = SaveDebouncer::new(Duration::from_millis(1000));

        debouncer.schedule(t0);
        assert!(debouncer.fire_due(t0 + Duration::from_millis(1000)));
        assert!(!debouncer.is_pending());
        assert!(!debouncer.fire_due(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn rescheduling_supersedes_previous_deadline() {
        let t0 = Instant::now();
        let mut debouncer = SaveDebouncer::new(Duration::from_millis(1000));

        debouncer.schedule(t0);
        debouncer.schedule(t0 + Duration::from_millis(800));

        // The original deadline has passed but was superseded.
        assert!(!debouncer.fire_due(t0 + Duration::from_millis(1000)));
        // Only the re-armed deadline fires, once.
        assert!(debouncer.fire_due(t0 + Duration::from_millis(1800)));
        assert!(!debouncer.fire_due(t0 + Duration::from_millis(1801)));
    }

    #[test]
    fn time_until_due_saturates_at_zero() {
        let t0 = Instant::now();
        let mut debouncer = SaveDebouncer::new(Duration::from_millis(500));
        assert_eq!(debouncer.time_until_due(t0), None);

        debouncer.schedule(t0);
        assert_eq!(
            debouncer.time_until_due(t0 + Duration::from_millis(200)),
            Some(Duration::from_millis(300))
        );
        assert_eq!(
            debouncer.time_until_due(t0 + Duration::from_secs(2)),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn cancel_disarms() {
        let t0 = Instant::now();
        let mut debouncer = SaveDebouncer::new(Duration::from_millis(100));
        debouncer.schedule(t0);
        debouncer.cancel();
        assert!(!debouncer.fire_due(t0 + Duration::from_secs(1)));
    }
}
