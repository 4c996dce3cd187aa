//! Incremental recovery state machine.
//!
//! One instance drives one market. Each call to [`RecoveryStateMachine::advance`]
//! runs either the backfill walk or one catch-up pass, persisting the
//! [`RecoveryState`] after every page so a restart resumes from the last
//! checkpoint.
//!
//! ```text
//!            recovered_all = false                  recovered_all = true
//!   +-----------------------------------+   +-----------------------------------+
//!   | fetch(cursor) -> frames -> save   |   | fetch(cursor) -> stage -> save    |
//!   | until the source has nothing older|-->| until cursor <= watermark         |
//!   +-----------------------------------+   | fold staged, move watermark, save |
//!                                           +-----------------------------------+
//! ```

use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::sink::FrameWriter;
use super::state::{RecoveryMode, RecoveryState};
use super::state_store::RecoveryStateStore;
use crate::config::MarketSettings;
use crate::constants::{BLOCKED_WARN_BURST, BLOCKED_WARN_EVERY};
use crate::errors::Result;
use crate::ohlc::OhlcStore;
use fortacrypt_market_data::{MarketDataError, PageFetcher, RetryClass, TradePage};

/// Outcome of one [`RecoveryStateMachine::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// State is checkpointed and more work is available right away.
    Continue,
    /// A catch-up pass finished and the watermark moved.
    Done,
}

/// Sleeps for `duration` unless `cancel` fires first.
///
/// Returns `true` when the sleep ran to completion.
pub(crate) async fn sleep_unless_cancelled(cancel: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        biased;
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(duration) => true,
    }
}

/// Consecutive blocked responses, used to thin out warnings.
#[derive(Debug, Default)]
struct BlockedStreak {
    count: u32,
}

impl BlockedStreak {
    /// Records one blocked attempt; `true` when it deserves a warning.
    fn record(&mut self) -> bool {
        self.count += 1;
        self.count <= BLOCKED_WARN_BURST || self.count % BLOCKED_WARN_EVERY == 0
    }

    fn reset(&mut self) {
        self.count = 0;
    }
}

pub struct RecoveryStateMachine {
    fetcher: Arc<dyn PageFetcher>,
    writer: FrameWriter,
    states: Arc<dyn RecoveryStateStore>,
    settings: MarketSettings,
    cancel: CancellationToken,
}

impl RecoveryStateMachine {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        ohlc_store: Arc<dyn OhlcStore>,
        states: Arc<dyn RecoveryStateStore>,
        settings: MarketSettings,
        cancel: CancellationToken,
    ) -> Self {
        let writer = FrameWriter::new(ohlc_store, fetcher.timestamp_unit());
        Self {
            fetcher,
            writer,
            states,
            settings,
            cancel,
        }
    }

    pub fn market_id(&self) -> &str {
        &self.settings.market_id
    }

    pub fn settings(&self) -> &MarketSettings {
        &self.settings
    }

    pub(crate) fn states(&self) -> &Arc<dyn RecoveryStateStore> {
        &self.states
    }

    pub(crate) fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Runs the cycle selected by `state` until it reaches a stopping point.
    ///
    /// Transport failures are retried after the blocked backoff. Any other
    /// failure is returned without checkpointing the page that caused it.
    pub async fn advance(&self, state: &mut RecoveryState) -> Result<Action> {
        match state.mode() {
            RecoveryMode::Backfill => self.backfill(state).await,
            RecoveryMode::CatchUp => self.catch_up(state).await,
        }
    }

    async fn backfill(&self, state: &mut RecoveryState) -> Result<Action> {
        let market = self.market_id();
        info!(
            "{}: recovering history from cursor {:?}",
            market, state.current_request_timestamp
        );

        let mut streak = BlockedStreak::default();
        loop {
            if self.cancel.is_cancelled() {
                info!("{}: backfill interrupted", market);
                return Ok(Action::Continue);
            }

            let cursor = state.current_request_timestamp;
            let Some(page) = self.fetch_page(cursor, &mut streak).await? else {
                return Ok(Action::Continue);
            };

            self.writer.write_backfill_page(market, &page).await?;

            if state.apply_backfill_page(cursor, &page) {
                state.finish_backfill();
                self.states.save(state).await?;
                info!("{}: all entries have been recovered", market);
                return Ok(Action::Continue);
            }

            self.states.save(state).await?;
            self.log_progress(state.current_request_timestamp);

            if !sleep_unless_cancelled(&self.cancel, self.settings.request_delay).await {
                return Ok(Action::Continue);
            }
        }
    }

    async fn catch_up(&self, state: &mut RecoveryState) -> Result<Action> {
        let market = self.market_id();
        let mut capture = state.is_fresh_pass();
        if capture {
            state.begin_catch_up_pass();
        }
        debug!(
            "{}: catch-up pass towards {:?} (resumed: {})",
            market, state.last_stored_timestamp, !capture
        );

        let mut streak = BlockedStreak::default();
        while state.needs_catch_up() {
            if self.cancel.is_cancelled() {
                info!("{}: catch-up interrupted", market);
                return Ok(Action::Continue);
            }

            let cursor = state.current_request_timestamp;
            let Some(page) = self.fetch_page(cursor, &mut streak).await? else {
                return Ok(Action::Continue);
            };

            self.writer
                .stage_page(market, &page, state.last_stored_timestamp)
                .await?;
            state.apply_catch_up_page(&page, capture);
            capture = false;

            if page.is_exhausted() {
                debug!("{}: source has nothing older, ending pass", market);
                break;
            }

            self.states.save(state).await?;
            self.log_progress(state.current_request_timestamp);

            if !state.needs_catch_up() {
                break;
            }
            if !sleep_unless_cancelled(&self.cancel, self.settings.request_delay).await {
                return Ok(Action::Continue);
            }
        }

        let written = self.writer.fold_staged(market).await?;
        state.finish_catch_up();
        self.states.save(state).await?;
        info!(
            "{}: entries successfully updated up to {:?} ({} frames written)",
            market, state.last_stored_timestamp, written
        );
        Ok(Action::Done)
    }

    /// Fetches one page, backing off on transport failures.
    ///
    /// `None` when cancelled while backing off.
    async fn fetch_page(
        &self,
        cursor: Option<i64>,
        streak: &mut BlockedStreak,
    ) -> Result<Option<TradePage>> {
        let market = self.market_id();
        loop {
            match self.fetcher.fetch(&self.settings.remote_id, cursor).await {
                Ok(page) => {
                    streak.reset();
                    return Ok(Some(page));
                }
                Err(err) if err.retry_class() == RetryClass::WithBackoff => {
                    self.log_blocked(streak, &err);
                    if !sleep_unless_cancelled(&self.cancel, self.settings.blocked_backoff).await {
                        return Ok(None);
                    }
                }
                Err(err) => {
                    error!("{}: unrecoverable fetch failure: {}", market, err);
                    return Err(err.into());
                }
            }
        }
    }

    fn log_blocked(&self, streak: &mut BlockedStreak, err: &MarketDataError) {
        let attempt = streak.count + 1;
        if streak.record() {
            warn!(
                "{}: blocked by source ({}), attempt {}, retrying in {}s",
                self.market_id(),
                err,
                attempt,
                self.settings.blocked_backoff.as_secs()
            );
        } else {
            debug!(
                "{}: still blocked ({}), attempt {}",
                self.market_id(),
                err,
                attempt
            );
        }
    }

    fn log_progress(&self, cursor: Option<i64>) {
        let Some(cursor) = cursor else {
            return;
        };
        match self.fetcher.timestamp_unit().to_datetime(cursor) {
            Some(at) => info!(
                "{}: entries recovered. Date: {}",
                self.market_id(),
                at.format("%d/%m/%Y %H:%M")
            ),
            None => info!("{}: entries recovered. Cursor: {}", self.market_id(), cursor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_streak_thins_out_warnings() {
        let mut streak = BlockedStreak::default();
        let warned: Vec<bool> = (0..21).map(|_| streak.record()).collect();

        assert!(warned[0] && warned[1] && warned[2]);
        assert!(!warned[3]);
        assert!(warned[9]);
        assert!(!warned[10]);
        assert!(warned[19]);
        assert_eq!(warned.iter().filter(|w| **w).count(), 5);

        streak.reset();
        assert!(streak.record());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_completes_without_cancellation() {
        let cancel = CancellationToken::new();
        assert!(sleep_unless_cancelled(&cancel, Duration::from_secs(300)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_sleep() {
        let cancel = CancellationToken::new();
        let sleeper = tokio::spawn({
            let cancel = cancel.clone();
            async move { sleep_unless_cancelled(&cancel, Duration::from_secs(3_600)).await }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();

        assert!(!sleeper.await.unwrap());
    }

    #[tokio::test]
    async fn test_sleep_skipped_when_already_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(!sleep_unless_cancelled(&cancel, Duration::ZERO).await);
    }
}
