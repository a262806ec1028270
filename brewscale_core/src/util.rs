//! Common time helpers for brewscale_core.

use std::time::Duration;

/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;

/// Tick period as a `Duration`, clamped to at least 1 ms.
#[inline]
pub fn tick_period(tick_ms: u64) -> Duration {
    Duration::from_millis(tick_ms.max(1))
}

/// Milliseconds to fractional seconds for display.
#[inline]
pub fn ms_to_secs_f32(ms: u64) -> f32 {
    (ms as f32) / (MILLIS_PER_SEC as f32)
}
