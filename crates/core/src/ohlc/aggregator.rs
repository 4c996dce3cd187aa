use log::trace;

use super::bucket::bucket_end;
use super::model::OhlcFrame;
use crate::errors::{Error, Result};
use fortacrypt_market_data::{TimestampUnit, TradeTick};

/// Folds ordered trades into hour frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct OhlcAggregator {
    unit: TimestampUnit,
}

impl OhlcAggregator {
    pub fn new(unit: TimestampUnit) -> Self {
        Self { unit }
    }

    pub fn unit(&self) -> TimestampUnit {
        self.unit
    }

    /// Aggregates `ticks`, which must be ordered oldest first.
    ///
    /// Emits one frame per bucket that holds at least one tick. The last,
    /// possibly incomplete, bucket is always emitted.
    pub fn aggregate(&self, ticks: &[TradeTick]) -> Result<Vec<OhlcFrame>> {
        let hour = self.unit.hour();
        let mut iter = ticks.iter();
        let Some(first) = iter.next() else {
            return Ok(Vec::new());
        };

        let mut frames = Vec::new();
        let mut end = bucket_end(first.timestamp, self.unit);
        let mut current = OhlcFrame::seed(end - hour, first.price, first.volume);
        let mut previous = first.timestamp;

        for tick in iter {
            if tick.timestamp < previous {
                return Err(Error::invariant(format!(
                    "tick {} arrived after tick {}",
                    tick.timestamp, previous
                )));
            }
            previous = tick.timestamp;

            if tick.timestamp > end {
                frames.push(current);
                end = bucket_end(tick.timestamp, self.unit);
                current = OhlcFrame::seed(end - hour, tick.price, tick.volume);
            } else {
                current.close = tick.price;
                current.low = current.low.min(tick.price);
                current.high = current.high.max(tick.price);
                current.volume += tick.volume;
            }
        }
        frames.push(current);

        trace!("Aggregated {} ticks into {} frames", ticks.len(), frames.len());
        Ok(frames)
    }
}

/// Shorthand for [`OhlcAggregator::aggregate`].
pub fn aggregate(ticks: &[TradeTick], unit: TimestampUnit) -> Result<Vec<OhlcFrame>> {
    OhlcAggregator::new(unit).aggregate(ticks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fortacrypt_market_data::TradeDirection;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const MS: TimestampUnit = TimestampUnit::Milliseconds;

    fn tick(timestamp: i64, price: Decimal, volume: Decimal) -> TradeTick {
        TradeTick::new(timestamp, price, volume, TradeDirection::Buy)
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[], MS).unwrap().is_empty());
    }

    #[test]
    fn test_two_buckets() {
        let ticks = vec![
            tick(1552966701233, dec!(100), dec!(1)),
            tick(1552967141233, dec!(110), dec!(2)),
            tick(1552970041233, dec!(105), dec!(3)),
        ];

        let frames = aggregate(&ticks, MS).unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].bucket_start, 1552964400000);
        assert_eq!(frames[0].open, dec!(100));
        assert_eq!(frames[0].close, dec!(110));
        assert_eq!(frames[0].high, dec!(110));
        assert_eq!(frames[0].low, dec!(100));
        assert_eq!(frames[0].volume, dec!(3));
        assert_eq!(frames[1].bucket_start, 1552968000000);
        assert_eq!(frames[1], OhlcFrame::seed(1552968000000, dec!(105), dec!(3)));
    }

    #[test]
    fn test_tick_on_the_hour_stays_in_previous_bucket() {
        let ticks = vec![
            tick(1552966701233, dec!(100), dec!(1)),
            tick(1552968000000, dec!(90), dec!(1)),
            tick(1552968000001, dec!(95), dec!(1)),
        ];

        let frames = aggregate(&ticks, MS).unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].bucket_start, 1552964400000);
        assert_eq!(frames[0].close, dec!(90));
        assert_eq!(frames[0].low, dec!(90));
        assert_eq!(frames[0].volume, dec!(2));
        assert_eq!(frames[1].bucket_start, 1552968000000);
        assert_eq!(frames[1].open, dec!(95));
    }

    #[test]
    fn test_equal_timestamps_are_accepted() {
        let ticks = vec![
            tick(10, dec!(5), dec!(1)),
            tick(10, dec!(7), dec!(1)),
            tick(10, dec!(4), dec!(1)),
        ];

        let frames = aggregate(&ticks, TimestampUnit::Seconds).unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].open, dec!(5));
        assert_eq!(frames[0].high, dec!(7));
        assert_eq!(frames[0].low, dec!(4));
        assert_eq!(frames[0].close, dec!(4));
        assert_eq!(frames[0].volume, dec!(3));
    }

    #[test]
    fn test_gap_emits_no_empty_frames() {
        let ticks = vec![
            tick(10, dec!(5), dec!(1)),
            tick(3 * 3_600 + 10, dec!(6), dec!(1)),
        ];

        let frames = aggregate(&ticks, TimestampUnit::Seconds).unwrap();

        let starts: Vec<i64> = frames.iter().map(|f| f.bucket_start).collect();
        assert_eq!(starts, vec![0, 3 * 3_600]);
    }

    #[test]
    fn test_unsorted_input_is_rejected() {
        let ticks = vec![tick(20, dec!(5), dec!(1)), tick(10, dec!(5), dec!(1))];

        let err = aggregate(&ticks, TimestampUnit::Seconds).unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
    }
}
