use std::time::Duration;

/// Result of one countdown tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerTick {
    Counting(u64),
    /// Reached zero on this tick. Reported once per run.
    Expired,
    /// Already expired earlier; nothing to do.
    Idle,
}

/// One-second-resolution countdown over running time. The host's ticks only
/// decide when it is looked at; the remaining time always comes from the
/// elapsed running time passed in, so an off-phase tick can never expire it
/// early.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountdownTimer {
    duration_secs: u64,
    remaining_secs: u64,
    expired: bool,
}

impl CountdownTimer {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            duration_secs,
            remaining_secs: duration_secs,
            expired: false,
        }
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Fraction of the countdown already used, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.duration_secs == 0 {
            return 1.0;
        }
        1.0 - self.remaining_secs as f64 / self.duration_secs as f64
    }

    pub fn tick(&mut self, elapsed: Duration) -> TimerTick {
        if self.expired {
            return TimerTick::Idle;
        }
        self.remaining_secs = self.duration_secs.saturating_sub(elapsed.as_secs());
        if elapsed >= self.limit() {
            self.remaining_secs = 0;
            self.expired = true;
            TimerTick::Expired
        } else {
            TimerTick::Counting(self.remaining_secs)
        }
    }

    /// The full countdown as a duration.
    pub fn limit(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    pub fn reset(&mut self) {
        self.remaining_secs = self.duration_secs;
        self.expired = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_counts_down_and_expires_once() {
        let mut timer = CountdownTimer::new(3);
        assert_eq!(timer.tick(secs(1)), TimerTick::Counting(2));
        assert_eq!(timer.tick(secs(2)), TimerTick::Counting(1));
        assert_eq!(timer.tick(secs(3)), TimerTick::Expired);
        assert_eq!(timer.tick(secs(4)), TimerTick::Idle);
        assert_eq!(timer.tick(secs(5)), TimerTick::Idle);
        assert!(timer.is_expired());
        assert_eq!(timer.remaining_secs(), 0);
    }

    #[test]
    fn test_does_not_expire_before_full_duration() {
        let mut timer = CountdownTimer::new(3);
        // Ticks arriving off the second boundary.
        assert_eq!(timer.tick(Duration::from_millis(300)), TimerTick::Counting(3));
        assert_eq!(timer.tick(Duration::from_millis(2300)), TimerTick::Counting(1));
        assert_eq!(timer.tick(Duration::from_millis(2999)), TimerTick::Counting(1));
        assert!(!timer.is_expired());
        assert_eq!(timer.tick(Duration::from_millis(3300)), TimerTick::Expired);
    }

    #[test]
    fn test_late_tick_expires_immediately() {
        let mut timer = CountdownTimer::new(2);
        assert_eq!(timer.tick(secs(10)), TimerTick::Expired);
        assert_eq!(timer.remaining_secs(), 0);
    }

    #[test]
    fn test_reset_restores_full_duration() {
        let mut timer = CountdownTimer::new(2);
        timer.tick(secs(2));
        timer.reset();
        assert_eq!(timer.remaining_secs(), 2);
        assert!(!timer.is_expired());
        assert_eq!(timer.progress(), 0.0);
    }

    #[test]
    fn test_progress() {
        let mut timer = CountdownTimer::new(4);
        timer.tick(secs(1));
        assert!((timer.progress() - 0.25).abs() < 1e-9);
    }
}
