//! Glue between fetched pages and the OHLC store.

use log::debug;
use std::sync::Arc;

use crate::errors::Result;
use crate::ohlc::{merge, merge_preceding, MergeOutcome, OhlcAggregator, OhlcFrame, OhlcStore};
use fortacrypt_market_data::{TimestampUnit, TradePage, TradeTick};

/// Turns pages into persisted frames for one timestamp unit.
///
/// Backfill pages are always older than anything stored, so they are folded
/// in immediately against the oldest frame. Catch-up pages arrive newest
/// first as well, so their ticks are staged and folded forward against the
/// newest frame once the pass is complete.
#[derive(Clone)]
pub struct FrameWriter {
    store: Arc<dyn OhlcStore>,
    aggregator: OhlcAggregator,
}

impl FrameWriter {
    pub fn new(store: Arc<dyn OhlcStore>, unit: TimestampUnit) -> Self {
        Self {
            store,
            aggregator: OhlcAggregator::new(unit),
        }
    }

    /// Aggregates a backfill page and writes it below the oldest frame.
    ///
    /// Returns the number of frames written.
    pub async fn write_backfill_page(&self, market: &str, page: &TradePage) -> Result<usize> {
        if page.entries.is_empty() {
            return Ok(0);
        }

        let frames = self.aggregator.aggregate(&page.ascending())?;
        let oldest = self.store.oldest_frame(market)?;
        let outcome = merge_preceding(frames, oldest.as_ref())?;
        let frames = Self::checked_frames(outcome)?;
        if frames.is_empty() {
            return Ok(0);
        }

        let written = self.store.upsert_frames(market, &frames).await?;
        debug!("{}: backfill page wrote {} frames", market, written);
        Ok(written)
    }

    /// Stages the ticks of a catch-up page that are newer than `watermark`.
    ///
    /// Returns the number of ticks newly staged.
    pub async fn stage_page(
        &self,
        market: &str,
        page: &TradePage,
        watermark: Option<i64>,
    ) -> Result<usize> {
        let fresh: Vec<TradeTick> = page
            .ascending()
            .into_iter()
            .filter(|tick| !matches!(watermark, Some(w) if tick.timestamp <= w))
            .collect();
        if fresh.is_empty() {
            return Ok(0);
        }

        self.store.stage_trades(market, &fresh).await
    }

    /// Folds every staged tick into frames after the newest stored frame.
    ///
    /// Returns the number of frames written.
    pub async fn fold_staged(&self, market: &str) -> Result<usize> {
        let staged = self.store.staged_trades(market)?;
        let frames = self.aggregator.aggregate(&staged)?;
        let newest = self.store.newest_frame(market)?;
        let frames = Self::checked_frames(merge(frames, newest.as_ref())?)?;

        let written = self.store.commit_staged(market, &frames).await?;
        debug!(
            "{}: folded {} staged ticks into {} frames",
            market,
            staged.len(),
            written
        );
        Ok(written)
    }

    fn checked_frames(outcome: MergeOutcome) -> Result<Vec<OhlcFrame>> {
        let frames = outcome.into_frames();
        for frame in &frames {
            frame.validate()?;
        }
        Ok(frames)
    }
}
