//! OHLC storage traits.
//!
//! This module defines the storage interface for hour frames and for the
//! catch-up staging area. Implementations handle the actual database work.

use async_trait::async_trait;

use super::model::OhlcFrame;
use crate::errors::Result;
use fortacrypt_market_data::TradeTick;

/// Storage interface for OHLC frames.
///
/// # Design Notes
///
/// - Async methods are used for writes, which go through a single writer
/// - Sync methods are used for reads, which are short indexed lookups
/// - The market is passed on every call, frames of different markets never mix
/// - Staged trades hold catch-up ticks until a pass folds them into frames
#[async_trait]
pub trait OhlcStore: Send + Sync {
    // =========================================================================
    // Frames
    // =========================================================================

    /// Inserts or overwrites frames by `(market, bucket_start)`.
    ///
    /// Returns the number of frames written.
    async fn upsert_frames(&self, market: &str, frames: &[OhlcFrame]) -> Result<usize>;

    /// The frame with the greatest bucket for `market`.
    fn newest_frame(&self, market: &str) -> Result<Option<OhlcFrame>>;

    /// The frame with the smallest bucket for `market`.
    fn oldest_frame(&self, market: &str) -> Result<Option<OhlcFrame>>;

    /// Every frame of `market`, ascending by bucket.
    fn frames(&self, market: &str) -> Result<Vec<OhlcFrame>>;

    // =========================================================================
    // Staging
    // =========================================================================

    /// Stores catch-up ticks. Re-delivered ticks are ignored.
    ///
    /// Returns the number of ticks newly staged.
    async fn stage_trades(&self, market: &str, ticks: &[TradeTick]) -> Result<usize>;

    /// Every staged tick of `market`, ascending by timestamp.
    fn staged_trades(&self, market: &str) -> Result<Vec<TradeTick>>;

    /// Writes `frames` and drops every staged tick of `market` in one transaction.
    ///
    /// Returns the number of frames written.
    async fn commit_staged(&self, market: &str, frames: &[OhlcFrame]) -> Result<usize>;
}
