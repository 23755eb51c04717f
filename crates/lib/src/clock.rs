//! Time provider abstraction
//!
//! Stores stamp `created_at` and `modified_at` on every record. The [`Clock`]
//! trait lets production code use real system time while tests drive a
//! controllable [`FixedClock`].
//!
//! # Example
//!
//! ```
//! use tabula::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! assert!(clock.now_timestamp() > 0);
//! ```

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// A time provider for record timestamps.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time as milliseconds since Unix epoch.
    fn now_millis(&self) -> u64;

    /// The current time as signed milliseconds, the form stored in BIGINT columns.
    fn now_timestamp(&self) -> i64 {
        i64::try_from(self.now_millis()).unwrap_or(i64::MAX)
    }
}

/// Formats epoch milliseconds as RFC3339, falling back to the epoch itself.
pub fn millis_to_rfc3339(millis: u64) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(chrono::DateTime::from_timestamp_millis)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "1970-01-01T00:00:00+00:00".to_string())
}

/// Production clock using real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Test clock that ticks one millisecond per reading.
///
/// Consecutive writes through a store using this clock get distinct,
/// predictable timestamps. `advance` and `set` move it explicitly.
///
/// ```
/// use tabula::{Clock, FixedClock};
///
/// let clock = FixedClock::new(1000);
/// assert_eq!(clock.now_millis(), 1000);
/// assert_eq!(clock.now_millis(), 1001);
///
/// clock.advance(500);
/// assert_eq!(clock.now_millis(), 1502);
/// ```
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicU64,
}

impl FixedClock {
    /// Create a clock whose first reading is `millis`.
    pub fn new(millis: u64) -> Self {
        Self {
            millis: AtomicU64::new(millis),
        }
    }

    /// Move the clock forward by `ms` milliseconds.
    pub fn advance(&self, ms: u64) {
        self.millis.fetch_add(ms, Ordering::SeqCst);
    }

    /// Make `ms` the next reading.
    pub fn set(&self, ms: u64) {
        self.millis.store(ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.millis.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(1_704_067_200_000)
    }
}

impl Clone for FixedClock {
    /// An independent clock at the same reading.
    fn clone(&self) -> Self {
        Self::new(self.millis.load(Ordering::SeqCst))
    }
}
