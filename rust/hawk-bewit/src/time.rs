//! Injectable time source.
//!
//! Expiry is the only time-dependent property of a bewit. Both issuance and
//! verification read the current time through a [`Clock`] and then apply the
//! caller's `localtime_offset_msec`, so tests can pin exact instants.

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

/// Source of the current time in milliseconds since the epoch.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_msec(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_msec(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default()
    }
}

/// A clock stopped at a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_msec(&self) -> u64 {
        self.0
    }
}

/// Current time in milliseconds, adjusted by `offset_msec`.
pub fn now_msec(clock: &dyn Clock, offset_msec: i64) -> u64 {
    let adjusted = i128::from(clock.now_msec()) + i128::from(offset_msec);
    u64::try_from(adjusted.max(0)).unwrap_or(u64::MAX)
}

/// Current time in whole seconds, adjusted by `offset_msec`.
pub fn now_sec(clock: &dyn Clock, offset_msec: i64) -> u64 {
    now_msec(clock, offset_msec) / 1000
}
