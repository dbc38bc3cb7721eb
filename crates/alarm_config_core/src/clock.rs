//! Time source for write timestamps.

use std::cell::Cell;

/// Supplies the current time in Unix epoch seconds.
pub trait Clock {
    fn now_epoch_seconds(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Manually driven clock, mainly for tests and replays.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Cell<i64>,
}

impl ManualClock {
    pub fn new(now: i64) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.set(now);
    }

    pub fn advance(&self, seconds: i64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now_epoch_seconds(&self) -> i64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_epoch_seconds(&self) -> i64 {
        (**self).now_epoch_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock, SystemClock};

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now_epoch_seconds(), 100);
        clock.advance(5);
        assert_eq!(clock.now_epoch_seconds(), 105);
        clock.set(7);
        assert_eq!((&clock).now_epoch_seconds(), 7);
    }

    #[test]
    fn system_clock_is_past_2020() {
        assert!(SystemClock.now_epoch_seconds() > 1_577_836_800);
    }
}
