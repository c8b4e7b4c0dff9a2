//! Leading + trailing edge throttling driven by an explicit clock.
//!
//! The throttle never sleeps or spawns anything. Callers hand it the
//! current instant; it answers whether a call fires now, and remembers the
//! latest suppressed call so it can be fired later by [`Throttle::poll`]
//! or [`Throttle::flush`].

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

// ============================================================================
// Clock
// ============================================================================

/// Source of monotonic time.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The real monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give
/// another to the engine under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    /// Moves time forward.
    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    /// Moves time forward by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }
}

// ============================================================================
// Throttle
// ============================================================================

/// Coalesces calls so that at most one fires per interval.
///
/// The first call after an idle period fires immediately. Calls inside the
/// interval replace a single pending slot; the pending call fires once the
/// interval has elapsed, so the latest arguments are never lost.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval: Duration,
    last_fired: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn is_cooling(&self, now: Instant) -> bool {
        self.last_fired
            .is_some_and(|last| now.saturating_duration_since(last) < self.interval)
    }

    /// Offers a call. Returns it back if it should fire now.
    ///
    /// A call that fires supersedes any pending one.
    pub fn call(&mut self, now: Instant, args: T) -> Option<T> {
        if self.is_cooling(now) {
            self.pending = Some(args);
            return None;
        }
        self.pending = None;
        self.last_fired = Some(now);
        Some(args)
    }

    /// Fires the pending call if its interval has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_none() || self.is_cooling(now) {
            return None;
        }
        self.last_fired = Some(now);
        self.pending.take()
    }

    /// Fires the pending call regardless of the interval.
    pub fn flush(&mut self, now: Instant) -> Option<T> {
        let args = self.pending.take()?;
        self.last_fired = Some(now);
        Some(args)
    }

    /// The suppressed call waiting for the trailing edge, if any.
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    /// When the pending call becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref()?;
        self.last_fired.map(|last| last + self.interval)
    }

    /// Forgets the pending call and the last firing time.
    pub fn reset(&mut self) {
        self.last_fired = None;
        self.pending = None;
    }
}
