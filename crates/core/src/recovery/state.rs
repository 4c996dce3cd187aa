//! Per-market recovery progress.
//!
//! This module contains the persisted record the state machine drives, and
//! the transition rules applied after each page. The record never decides
//! anything about I/O; it only moves its cursors and watermarks.

use serde::{Deserialize, Serialize};

use fortacrypt_market_data::TradePage;

// =============================================================================
// Recovery Mode
// =============================================================================

/// Which loop the next cycle runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryMode {
    /// Walk backward from the newest trade until the source has nothing older.
    Backfill,
    /// Walk backward from the newest trade until reaching the watermark.
    CatchUp,
}

// =============================================================================
// Recovery State
// =============================================================================

/// Persisted progress of one market.
///
/// Serialized with exactly these five fields; the market id is the key of
/// the enclosing document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryState {
    #[serde(skip)]
    pub market_id: String,

    /// Whether the full history has been walked at least once
    pub recovered_all: bool,

    /// Cursor for the next request, `None` means start from the newest trade
    pub current_request_timestamp: Option<i64>,

    /// Watermark: trades up to here are in storage. Never moves backward.
    pub last_stored_timestamp: Option<i64>,

    /// Oldest cursor ever requested
    pub first_stored_timestamp: Option<i64>,

    /// Newest trade seen by the current pass. During backfill this is the
    /// newest trade of the first page, the newest one already in frames.
    pub most_recent_timestamp: Option<i64>,
}

impl RecoveryState {
    pub fn new(market_id: impl Into<String>) -> Self {
        Self {
            market_id: market_id.into(),
            recovered_all: false,
            current_request_timestamp: None,
            last_stored_timestamp: None,
            first_stored_timestamp: None,
            most_recent_timestamp: None,
        }
    }

    pub fn mode(&self) -> RecoveryMode {
        if self.recovered_all {
            RecoveryMode::CatchUp
        } else {
            RecoveryMode::Backfill
        }
    }

    /// Applies a backfill page fetched with `cursor`.
    ///
    /// Returns `true` when the page ends the backfill.
    pub fn apply_backfill_page(&mut self, cursor: Option<i64>, page: &TradePage) -> bool {
        if self.last_stored_timestamp.is_none() {
            self.last_stored_timestamp = page.oldest_timestamp();
            self.most_recent_timestamp = page.newest_timestamp;
        }
        if cursor.is_some() {
            self.first_stored_timestamp = cursor;
        }
        self.current_request_timestamp = page.next_cursor;

        let exhausted = page.is_exhausted();
        if exhausted {
            self.recovered_all = true;
        }
        exhausted
    }

    pub fn finish_backfill(&mut self) {
        self.recovered_all = true;
        self.current_request_timestamp = None;
        if self.most_recent_timestamp.is_none() {
            self.most_recent_timestamp = self.last_stored_timestamp;
        }
    }

    /// Opens a fresh catch-up pass.
    ///
    /// Everything up to `most_recent_timestamp` is already in frames, so the
    /// watermark is lifted to it. Only the first pass after backfill moves it;
    /// a completed catch-up pass leaves the two equal.
    pub fn begin_catch_up_pass(&mut self) {
        if let (Some(stored), Some(recent)) = (self.last_stored_timestamp, self.most_recent_timestamp) {
            if recent > stored {
                self.last_stored_timestamp = Some(recent);
            }
        }
    }

    /// A catch-up pass is fresh when it has not requested any page yet.
    pub fn is_fresh_pass(&self) -> bool {
        self.current_request_timestamp.is_none()
    }

    /// Whether the catch-up walk has not yet reached the watermark.
    pub fn needs_catch_up(&self) -> bool {
        match (self.current_request_timestamp, self.last_stored_timestamp) {
            (None, _) | (_, None) => true,
            (Some(cursor), Some(watermark)) => cursor > watermark,
        }
    }

    /// Applies a catch-up page.
    ///
    /// `capture` records the page's newest trade as the pass target.
    pub fn apply_catch_up_page(&mut self, page: &TradePage, capture: bool) {
        if capture {
            if let Some(newest) = page.newest_timestamp {
                self.most_recent_timestamp = Some(newest);
            }
        }
        self.current_request_timestamp = page.next_cursor;
    }

    /// Moves the watermark to the pass target and closes the pass.
    pub fn finish_catch_up(&mut self) {
        self.last_stored_timestamp = match (self.last_stored_timestamp, self.most_recent_timestamp) {
            (Some(stored), Some(recent)) => Some(stored.max(recent)),
            (stored, recent) => stored.or(recent),
        };
        self.current_request_timestamp = None;
    }
}
