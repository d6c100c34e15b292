//! Timestamp translation between WP ticks and Android milliseconds.
//!
//! A WP tick is 100 ns since 1601-01-01 UTC; Android stores milliseconds
//! since 1970-01-01 UTC.

use chrono::{DateTime, Utc};

/// Milliseconds between 1601-01-01 and 1970-01-01.
pub const EPOCH_OFFSET_MS: i64 = 11_644_473_600_000;

/// Ticks per millisecond.
pub const TICKS_PER_MS: i64 = 10_000;

/// Convert WP ticks to Android milliseconds. Sub-millisecond ticks truncate toward zero.
pub const fn wp_to_android(ticks: i64) -> i64 {
    ticks / TICKS_PER_MS - EPOCH_OFFSET_MS
}

/// Convert Android milliseconds to WP ticks.
///
/// Only for values known to be in range; input read from a document goes
/// through [`checked_android_to_wp`].
pub const fn android_to_wp(ms: i64) -> i64 {
    (ms + EPOCH_OFFSET_MS) * TICKS_PER_MS
}

/// [`android_to_wp`] returning `None` when the tick count overflows `i64`.
pub const fn checked_android_to_wp(ms: i64) -> Option<i64> {
    match ms.checked_add(EPOCH_OFFSET_MS) {
        Some(shifted) => shifted.checked_mul(TICKS_PER_MS),
        None => None,
    }
}

/// Android milliseconds for a wall-clock instant.
pub fn datetime_to_android(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}
