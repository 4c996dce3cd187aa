//! Property-based integration tests for OHLC aggregation and merging.
//!
//! These tests verify that frame invariants hold across arbitrary ordered
//! trade sequences, using the `proptest` crate for random test case generation.

use fortacrypt_core::ohlc::{aggregate, bucket_start, merge, OhlcFrame};
use fortacrypt_market_data::{TimestampUnit, TradeDirection, TradeTick};
use proptest::prelude::*;
use rust_decimal::Decimal;

const HOUR_MS: i64 = 3_600_000;
const ORIGIN: i64 = 1_552_960_800_000;

// =============================================================================
// Generators
// =============================================================================

/// Generates one tick at an arbitrary offset within a few days of `ORIGIN`.
fn arb_tick() -> impl Strategy<Value = TradeTick> {
    (
        0i64..(HOUR_MS * 72),
        1i64..100_000_000,   // price in cents
        0i64..1_000_000_000, // volume in 1e-8 units
        any::<bool>(),
    )
        .prop_map(|(offset, price, volume, buy)| {
            let direction = if buy {
                TradeDirection::Buy
            } else {
                TradeDirection::Sell
            };
            TradeTick::new(
                ORIGIN + offset,
                Decimal::new(price, 2),
                Decimal::new(volume, 8),
                direction,
            )
        })
}

/// Generates a tick sequence ordered oldest first.
fn arb_ordered_ticks() -> impl Strategy<Value = Vec<TradeTick>> {
    prop::collection::vec(arb_tick(), 0..200).prop_map(|mut ticks| {
        ticks.sort_by_key(|tick| tick.timestamp);
        ticks
    })
}

/// Generates an ordered sequence together with a split point.
fn arb_split_ticks() -> impl Strategy<Value = (Vec<TradeTick>, usize)> {
    prop::collection::vec(arb_tick(), 2..200).prop_flat_map(|mut ticks| {
        ticks.sort_by_key(|tick| tick.timestamp);
        let len = ticks.len();
        (Just(ticks), 1..len)
    })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Every aggregated frame satisfies low <= open, close <= high and volume >= 0.
    #[test]
    fn prop_frames_are_valid(ticks in arb_ordered_ticks()) {
        let frames = aggregate(&ticks, TimestampUnit::Milliseconds).unwrap();

        for frame in &frames {
            prop_assert!(frame.validate().is_ok(), "invalid frame {:?}", frame);
            prop_assert_eq!(frame.bucket_start % HOUR_MS, 0);
        }
    }

    /// Frames are strictly ascending and one frame exists per occupied bucket.
    #[test]
    fn prop_one_frame_per_occupied_bucket(ticks in arb_ordered_ticks()) {
        let frames = aggregate(&ticks, TimestampUnit::Milliseconds).unwrap();

        let starts: Vec<i64> = frames.iter().map(|f| f.bucket_start).collect();
        prop_assert!(starts.windows(2).all(|pair| pair[0] < pair[1]));

        let mut expected: Vec<i64> = ticks
            .iter()
            .map(|tick| bucket_start(tick.timestamp, TimestampUnit::Milliseconds))
            .collect();
        expected.dedup();
        prop_assert_eq!(starts, expected);
    }

    /// Aggregation neither creates nor loses volume.
    #[test]
    fn prop_volume_is_conserved(ticks in arb_ordered_ticks()) {
        let frames = aggregate(&ticks, TimestampUnit::Milliseconds).unwrap();

        let tick_volume: Decimal = ticks.iter().map(|t| t.volume).sum();
        let frame_volume: Decimal = frames.iter().map(|f| f.volume).sum();
        prop_assert_eq!(tick_volume, frame_volume);
    }

    /// Aggregation is deterministic.
    #[test]
    fn prop_aggregate_is_repeatable(ticks in arb_ordered_ticks()) {
        let first = aggregate(&ticks, TimestampUnit::Milliseconds).unwrap();
        let second = aggregate(&ticks, TimestampUnit::Milliseconds).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Merging against nothing persisted appends everything unchanged.
    #[test]
    fn prop_merge_without_history_is_identity(ticks in arb_ordered_ticks()) {
        let frames = aggregate(&ticks, TimestampUnit::Milliseconds).unwrap();

        let outcome = merge(frames.clone(), None).unwrap();

        prop_assert!(outcome.updated.is_none());
        prop_assert_eq!(outcome.appended, frames);
    }

    /// Aggregating in two batches and merging equals aggregating at once.
    #[test]
    fn prop_incremental_merge_matches_full_aggregation((ticks, split) in arb_split_ticks()) {
        let unit = TimestampUnit::Milliseconds;
        let full = aggregate(&ticks, unit).unwrap();

        let (older, newer) = ticks.split_at(split);
        let mut persisted = aggregate(older, unit).unwrap();
        let last = persisted.pop();
        let outcome = merge(aggregate(newer, unit).unwrap(), last.as_ref()).unwrap();

        let mut combined: Vec<OhlcFrame> = persisted;
        if outcome.updated.is_none() {
            combined.extend(last);
        }
        combined.extend(outcome.into_frames());

        prop_assert_eq!(combined, full);
    }
}
