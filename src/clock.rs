//! Injectable time and randomness.
//!
//! Handlers and middleware never call `Utc::now`, `Instant::now` or
//! `rand::thread_rng` directly. They go through [`Capabilities`], so tests can
//! pin timestamps, measured latencies and generated ids.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::Rng;

/// Source of wall-clock and monotonic time.
pub trait Clock: Send + Sync + 'static {
    /// Current wall-clock time in UTC.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Monotonic reading. Only differences between two readings are meaningful.
    fn monotonic(&self) -> Duration;
}

/// Source of generated resource ids.
pub trait IdSource: Send + Sync + 'static {
    /// Returns an id in `0..upper`.
    fn next_id(&self, upper: u32) -> u32;
}

/// The real clock.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Uniform ids from the thread-local RNG.
#[derive(Debug, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&self, upper: u32) -> u32 {
        rand::thread_rng().gen_range(0..upper)
    }
}

/// Shared capabilities handed to handlers and middleware.
#[derive(Clone)]
pub struct Capabilities {
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdSource>,
}

impl Capabilities {
    pub fn new(clock: impl Clock, ids: impl IdSource) -> Self {
        Self { clock: Arc::new(clock), ids: Arc::new(ids) }
    }

    /// System clock and thread-local RNG.
    pub fn system() -> Self {
        Self::new(SystemClock::new(), RandomIds)
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::system()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_stay_below_upper_bound() {
        let ids = RandomIds;
        for _ in 0..1_000 {
            assert!(ids.next_id(1000) < 1000);
        }
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.monotonic();
        let b = clock.monotonic();
        assert!(b >= a);
    }
}
