//! Blocking time source for motion primitives.
//!
//! Every delay in the motion layer is a deliberate rate limit for the
//! physical actuator, so time is injected instead of read from globals:
//! [`SystemClock`] really sleeps, [`ManualClock`] only advances a virtual
//! counter and records each sleep.

use std::thread;
use std::time::{Duration, Instant};

/// Monotonic clock that can block the caller.
pub trait Clock: Send {
    /// Time elapsed since the clock was created.
    fn now(&self) -> Duration;

    /// Block the calling thread for `duration`.
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock backed by `Instant` and `thread::sleep`.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start a clock at zero.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Virtual clock: `sleep` returns immediately and advances `now`.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    /// Start a virtual clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward without recording a sleep.
    pub fn advance(&mut self, duration: Duration) {
        self.elapsed = self.elapsed.saturating_add(duration);
    }

    /// Every sleep requested so far, in order.
    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }

    /// Sum of all recorded sleeps, saturating at `Duration::MAX`.
    pub fn total_slept(&self) -> Duration {
        self.sleeps
            .iter()
            .fold(Duration::ZERO, |total, d| total.saturating_add(*d))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.elapsed
    }

    fn sleep(&mut self, duration: Duration) {
        self.elapsed = self.elapsed.saturating_add(duration);
        self.sleeps.push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_on_sleep() {
        let mut clock = ManualClock::new();
        clock.sleep(Duration::from_millis(50));
        clock.sleep(Duration::from_millis(250));
        clock.advance(Duration::from_secs(1));

        assert_eq!(clock.now(), Duration::from_millis(1300));
        assert_eq!(clock.sleeps().len(), 2);
        assert_eq!(clock.total_slept(), Duration::from_millis(300));
    }

    #[test]
    fn manual_clock_saturates_instead_of_overflowing() {
        let mut clock = ManualClock::new();
        clock.advance(Duration::MAX - Duration::from_secs(1));
        clock.sleep(Duration::from_secs(5));
        clock.sleep(Duration::MAX);
        assert_eq!(clock.now(), Duration::MAX);
        assert_eq!(clock.total_slept(), Duration::MAX);
    }

    #[test]
    fn system_clock_sleeps_at_least_requested() {
        let mut clock = SystemClock::new();
        let before = clock.now();
        clock.sleep(Duration::from_millis(5));
        assert!(clock.now() - before >= Duration::from_millis(5));
    }
}
