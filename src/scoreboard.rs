//! Concurrent request accounting shared by every listener.
//!
//! # Responsibilities
//! - Track current, peak, and total in-flight request counts
//! - Provide an RAII bracket so every handler exit path closes its slot
//! - Serve atomic snapshots for the stats endpoint
//!
//! # Design Decisions
//! - A single mutex guards all three counters together: `close()` compares
//!   `current` against `peak` before decrementing, which requires a
//!   consistent view of both fields
//! - Peak is sampled at close time, against the pre-decrement count. A burst
//!   of closes between two opens can under-report the true instantaneous
//!   peak by one in-flight request. Test harnesses assert on these exact
//!   semantics, so this is preserved rather than "fixed"

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Counters {
    current: u64,
    peak: u64,
    total: u64,
}

impl Counters {
    fn close(&mut self) {
        if self.current > self.peak {
            self.peak = self.current;
        }
        self.current = self.current.saturating_sub(1);
    }
}

/// Thread-safe scoreboard of request concurrency.
///
/// Cloning shares the underlying counters; every listener and handler holds
/// a clone of the same scoreboard.
#[derive(Debug, Clone, Default)]
pub struct Scoreboard {
    counters: Arc<Mutex<Counters>>,
}

impl Scoreboard {
    /// Create a scoreboard with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request entering service.
    pub fn open(&self) {
        let mut c = self.lock();
        c.current += 1;
        c.total += 1;
    }

    /// Record a request leaving service, sampling the peak first.
    pub fn close(&self) {
        self.lock().close();
    }

    /// Snapshot of `(peak, total)`, read under the same lock as mutations.
    pub fn stats(&self) -> (u64, u64) {
        let c = self.lock();
        (c.peak, c.total)
    }

    /// Zero peak and total. The current count is left alone so requests
    /// already in flight still close cleanly.
    pub fn reset(&self) {
        let mut c = self.lock();
        c.peak = 0;
        c.total = 0;
    }

    /// Open now, close when the returned guard drops.
    ///
    /// The guard closes on every exit path, including early returns and
    /// panics, so handler accounting cannot leak slots.
    pub fn track(&self) -> InFlightGuard {
        self.open();
        InFlightGuard {
            counters: Arc::clone(&self.counters),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// RAII bracket around one in-flight request.
#[derive(Debug)]
pub struct InFlightGuard {
    counters: Arc<Mutex<Counters>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .close();
    }
}
