//! Wall-clock timestamps
//!
//! Timestamps are informational only. Time priority inside the book comes
//! from arrival order, never from the clock.

use chrono::Utc;

/// Current time as Unix nanos.
///
/// Falls back to microsecond precision scaled to nanos outside the range
/// representable in an `i64` of nanoseconds (after year 2262).
pub fn now_nanos() -> i64 {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1_000))
}
