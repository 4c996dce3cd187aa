use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use fortacrypt_market_data::TimestampUnit;

/// One hour of trading activity.
///
/// Covers the timestamps in `(bucket_start, bucket_start + hour]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OhlcFrame {
    pub bucket_start: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl OhlcFrame {
    /// Frame seeded from a single trade.
    pub fn seed(bucket_start: i64, price: Decimal, volume: Decimal) -> Self {
        Self {
            bucket_start,
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }

    pub fn bucket_end(&self, unit: TimestampUnit) -> i64 {
        self.bucket_start + unit.hour()
    }

    /// Checks `low <= min(open, close) <= max(open, close) <= high` and `volume >= 0`.
    pub fn validate(&self) -> Result<()> {
        let body_low = self.open.min(self.close);
        let body_high = self.open.max(self.close);
        if self.low > body_low || body_high > self.high {
            return Err(Error::invariant(format!(
                "frame {} has bounds outside its body (o={} h={} l={} c={})",
                self.bucket_start, self.open, self.high, self.low, self.close
            )));
        }
        if self.volume < Decimal::ZERO {
            return Err(Error::invariant(format!(
                "frame {} has negative volume {}",
                self.bucket_start, self.volume
            )));
        }
        Ok(())
    }
}
