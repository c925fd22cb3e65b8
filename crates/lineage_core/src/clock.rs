//! Time source abstraction for timestamp stamping.
//!
//! # Responsibility
//! - Provide the current instant to repository save paths as plain data.
//! - Keep timestamp behavior deterministic in tests via `ManualClock`.
//!
//! # Invariants
//! - All timestamps are Unix epoch milliseconds (`i64`).
//! - Stamping is an explicit pre-save step; no entity reads the clock itself.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of "now" for create/update stamping.
pub trait Clock {
    /// Returns the current instant in epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// Wall-clock implementation used by production callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_millis() as i64,
            // Pre-epoch system clocks are not supported; clamp to 0.
            Err(_) => 0,
        }
    }
}

/// Deterministic clock for tests.
///
/// Starts at a fixed instant and only moves when `advance_ms`/`set_ms` is
/// called, which makes `created_at`/`updated_at` ordering assertions stable.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    /// Creates a manual clock pinned to `now_ms`.
    pub fn starting_at(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    /// Moves the clock forward by `delta_ms`.
    pub fn advance_ms(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    /// Pins the clock to an absolute instant.
    pub fn set_ms(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

impl Clock for &ManualClock {
    fn now_ms(&self) -> i64 {
        (*self).now_ms()
    }
}
