//! Trailing-edge debounce for bursts of resize events.

use std::time::{Duration, Instant};

/// Quiet period before a resize burst is acted on.
pub const RESIZE_QUIET: Duration = Duration::from_millis(250);

/// Collapses a burst of calls into one trailing invocation: only the last
/// call within the quiet window fires.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    due: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, due: None }
    }

    /// Record a call at `now`, pushing the deadline back.
    pub fn call(&mut self, now: Instant) {
        self.due = Some(now + self.quiet);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.due
    }

    /// `true` exactly once when the quiet window has elapsed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if due <= now => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}
