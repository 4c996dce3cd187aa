//! Hour bucket arithmetic.
//!
//! A trade stamped exactly on the hour closes the bucket that ends there,
//! it does not open the next one.

use fortacrypt_market_data::TimestampUnit;

/// Smallest hour-aligned instant `>= timestamp`.
pub fn bucket_end(timestamp: i64, unit: TimestampUnit) -> i64 {
    let hour = unit.hour();
    if timestamp.rem_euclid(hour) == 0 {
        timestamp
    } else {
        (timestamp.div_euclid(hour) + 1) * hour
    }
}

/// Start of the bucket `timestamp` falls into.
pub fn bucket_start(timestamp: i64, unit: TimestampUnit) -> i64 {
    bucket_end(timestamp, unit) - unit.hour()
}
