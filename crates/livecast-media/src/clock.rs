//! Monotonic clock abstraction.
//!
//! Segment timing decisions (when to cut, how long a segment ran) read a
//! [`Clock`] rather than `Instant::now()` directly so tests can drive the
//! segmenter with a deterministic, hand-advanced clock.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A monotonic clock reporting time elapsed since an arbitrary origin.
pub trait Clock: Send {
    /// Current monotonic reading.
    fn now(&self) -> Duration;
}

/// Production clock anchored to an `Instant` taken at construction.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is now.
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
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-advanced clock for deterministic tests.
///
/// Clones share the same underlying reading, so a test can keep one handle
/// and hand another to the segmenter.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// Create a clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by `delta`.
    pub fn advance(&self, delta: Duration) {
        *self.now.lock() += delta;
    }

    /// Set the clock to an absolute reading.
    pub fn set(&self, to: Duration) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}
