use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source identifier (e.g., "BUDA")
pub type ProviderId = &'static str;

/// Market identifier as known to the source (e.g., "btc-clp")
pub type MarketId = String;

/// Unit of every timestamp a source emits and accepts as a cursor.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampUnit {
    #[default]
    Milliseconds,
    Seconds,
}

impl TimestampUnit {
    /// Width of one hour in this unit.
    pub const fn hour(self) -> i64 {
        match self {
            TimestampUnit::Milliseconds => 3_600_000,
            TimestampUnit::Seconds => 3_600,
        }
    }

    /// Converts a raw timestamp to UTC, `None` when out of range.
    pub fn to_datetime(self, timestamp: i64) -> Option<DateTime<Utc>> {
        match self {
            TimestampUnit::Milliseconds => DateTime::from_timestamp_millis(timestamp),
            TimestampUnit::Seconds => DateTime::from_timestamp(timestamp, 0),
        }
    }
}
