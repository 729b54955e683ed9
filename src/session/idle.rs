use std::time::{Duration, Instant};

/// Accumulates seconds spent without keystrokes beyond a threshold.
///
/// Diagnostic only: idle time never feeds the speed or accuracy formulas,
/// since pauses are already reflected in elapsed time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdleTracker {
    threshold: Duration,
    idle: Duration,
}

impl IdleTracker {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            idle: Duration::ZERO,
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Called once per tick while running. Returns whether the tick was idle.
    pub fn on_tick(&mut self, now: Instant, last_keystroke_at: Instant, tick: Duration) -> bool {
        let quiet_for = now.saturating_duration_since(last_keystroke_at);
        if quiet_for > self.threshold {
            self.idle += tick;
            true
        } else {
            false
        }
    }

    pub fn idle_secs(&self) -> u64 {
        self.idle.as_secs()
    }

    pub fn reset(&mut self) {
        self.idle = Duration::ZERO;
    }
}
