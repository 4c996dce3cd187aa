use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::model::{OhlcFrameDB, StagedTradeDB, FRAME_COLUMNS, STAGED_COLUMNS};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::ohlc_frames::dsl as frames_dsl;
use crate::schema::staged_trades::dsl as staged_dsl;
use crate::utils::chunk_rows;
use fortacrypt_core::ohlc::{OhlcFrame, OhlcStore};
use fortacrypt_core::Result;
use fortacrypt_market_data::TradeTick;

pub struct OhlcRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl OhlcRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn replace_frames(conn: &mut SqliteConnection, rows: &[OhlcFrameDB]) -> Result<usize> {
    let mut total = 0;
    for chunk in chunk_rows(rows, FRAME_COLUMNS) {
        total += diesel::replace_into(frames_dsl::ohlc_frames)
            .values(chunk)
            .execute(conn)
            .map_err(StorageError::QueryFailed)?;
    }
    Ok(total)
}

fn first_frame(
    conn: &mut SqliteConnection,
    market: &str,
    newest: bool,
) -> Result<Option<OhlcFrame>> {
    let query = frames_dsl::ohlc_frames
        .filter(frames_dsl::market_id.eq(market))
        .select(OhlcFrameDB::as_select())
        .into_boxed();
    let query = if newest {
        query.order(frames_dsl::bucket_start.desc())
    } else {
        query.order(frames_dsl::bucket_start.asc())
    };

    query
        .first::<OhlcFrameDB>(conn)
        .optional()
        .into_core()?
        .map(OhlcFrame::try_from)
        .transpose()
}

// =============================================================================
// OhlcStore Implementation
// =============================================================================

#[async_trait]
impl OhlcStore for OhlcRepository {
    // =========================================================================
    // Frames
    // =========================================================================

    async fn upsert_frames(&self, market: &str, frames: &[OhlcFrame]) -> Result<usize> {
        if frames.is_empty() {
            return Ok(0);
        }

        let rows: Vec<OhlcFrameDB> = frames
            .iter()
            .map(|frame| OhlcFrameDB::from_frame(market, frame))
            .collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| replace_frames(conn, &rows))
            .await
    }

    fn newest_frame(&self, market: &str) -> Result<Option<OhlcFrame>> {
        let mut conn = get_connection(&self.pool)?;
        first_frame(&mut conn, market, true)
    }

    fn oldest_frame(&self, market: &str) -> Result<Option<OhlcFrame>> {
        let mut conn = get_connection(&self.pool)?;
        first_frame(&mut conn, market, false)
    }

    fn frames(&self, market: &str) -> Result<Vec<OhlcFrame>> {
        let mut conn = get_connection(&self.pool)?;

        frames_dsl::ohlc_frames
            .filter(frames_dsl::market_id.eq(market))
            .order(frames_dsl::bucket_start.asc())
            .select(OhlcFrameDB::as_select())
            .load::<OhlcFrameDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(OhlcFrame::try_from)
            .collect()
    }

    // =========================================================================
    // Staging
    // =========================================================================

    async fn stage_trades(&self, market: &str, ticks: &[TradeTick]) -> Result<usize> {
        if ticks.is_empty() {
            return Ok(0);
        }

        let rows = StagedTradeDB::from_ticks(market, ticks);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut staged = 0;
                for chunk in chunk_rows(&rows, STAGED_COLUMNS) {
                    staged += diesel::insert_or_ignore_into(staged_dsl::staged_trades)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::QueryFailed)?;
                }
                Ok(staged)
            })
            .await
    }

    fn staged_trades(&self, market: &str) -> Result<Vec<TradeTick>> {
        let mut conn = get_connection(&self.pool)?;

        staged_dsl::staged_trades
            .filter(staged_dsl::market_id.eq(market))
            .order((
                staged_dsl::timestamp.asc(),
                staged_dsl::seq.asc(),
                staged_dsl::trade_id.asc(),
            ))
            .select(StagedTradeDB::as_select())
            .load::<StagedTradeDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(TradeTick::try_from)
            .collect()
    }

    async fn commit_staged(&self, market: &str, frames: &[OhlcFrame]) -> Result<usize> {
        let market_id = market.to_string();
        let rows: Vec<OhlcFrameDB> = frames
            .iter()
            .map(|frame| OhlcFrameDB::from_frame(market, frame))
            .collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let written = replace_frames(conn, &rows)?;
                diesel::delete(staged_dsl::staged_trades.filter(staged_dsl::market_id.eq(market_id)))
                    .execute(conn)
                    .map_err(StorageError::QueryFailed)?;
                Ok(written)
            })
            .await
    }
}
