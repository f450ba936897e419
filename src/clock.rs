//! Nanosecond time sources used for rate estimation.
//!
//! Time never affects membership answers; it only feeds the query-rate
//! trackers and the sizing heuristic of the rotation manager.
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic, non-decreasing nanosecond counter.
pub trait Clock: Debug + Send + Sync {
    fn now_nanos(&self) -> u64;
}

/// Wall clock backed by [`Instant`], counting from its own creation.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_nanos(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Hand-driven clock for tests and simulations.
///
/// Every read returns the current value and then moves it forward by `step`
/// nanoseconds, so a `step` of 0 gives a frozen clock.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
    step: u64,
}

impl ManualClock {
    pub fn new(start_nanos: u64) -> Self {
        Self::ticking(start_nanos, 0)
    }

    pub fn ticking(start_nanos: u64, step: u64) -> Self {
        Self {
            now: AtomicU64::new(start_nanos),
            step,
        }
    }

    pub fn set(&self, nanos: u64) {
        self.now.store(nanos, Ordering::Relaxed);
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn peek(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> u64 {
        self.now.fetch_add(self.step, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_never_goes_back() {
        let clock = MonotonicClock::new();
        let first = clock.now_nanos();
        let second = clock.now_nanos();
        assert!(second >= first);
    }

    #[test]
    fn test_manual_clock_frozen() {
        let clock = ManualClock::new(42);
        assert_eq!(clock.now_nanos(), 42);
        assert_eq!(clock.now_nanos(), 42);
    }

    #[test]
    fn test_manual_clock_ticks_and_advances() {
        let clock = ManualClock::ticking(0, 10);
        assert_eq!(clock.now_nanos(), 0);
        assert_eq!(clock.now_nanos(), 10);
        clock.advance(Duration::from_micros(1));
        assert_eq!(clock.peek(), 1_020);
        clock.set(5);
        assert_eq!(clock.now_nanos(), 5);
    }
}
