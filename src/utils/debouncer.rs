use std::time::{Duration, Instant};

/// Trailing-edge debouncer.
///
/// Every `trigger_at` re-arms the timer; the action fires once the input
/// has been quiet for `delay`. Time is passed in so callers (and tests)
/// control the clock.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            last_event: None,
        }
    }

    /// Register an event at `now`, cancelling any earlier pending one
    pub fn trigger_at(&mut self, now: Instant) {
        self.last_event = Some(now);
    }

    /// True exactly once after the quiet period has elapsed
    pub fn should_execute_at(&mut self, now: Instant) -> bool {
        match self.last_event {
            Some(last) if now.saturating_duration_since(last) >= self.delay => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }

    /// Time left before the pending action fires; `None` when idle
    pub fn time_remaining_at(&self, now: Instant) -> Option<Duration> {
        self.last_event.map(|last| {
            self.delay
                .saturating_sub(now.saturating_duration_since(last))
        })
    }

    pub fn reset(&mut self) {
        self.last_event = None;
    }

    pub fn is_pending(&self) -> bool {
        self.last_event.is_some()
    }
}
