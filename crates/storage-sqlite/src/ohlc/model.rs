//! Database models for OHLC frames and staged trades.

use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::StorageError;
use fortacrypt_core::errors::Error;
use fortacrypt_core::ohlc::OhlcFrame;
use fortacrypt_market_data::{TradeDirection, TradeTick};

/// Database model for hour frames
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::ohlc_frames)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OhlcFrameDB {
    pub market_id: String,
    pub bucket_start: i64,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

/// Database model for catch-up ticks awaiting aggregation
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::staged_trades)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StagedTradeDB {
    pub market_id: String,
    pub trade_key: String,
    pub trade_id: Option<i64>,
    pub seq: i64,
    pub timestamp: i64,
    pub price: String,
    pub volume: String,
    pub direction: String,
}

pub(crate) const FRAME_COLUMNS: usize = 7;
pub(crate) const STAGED_COLUMNS: usize = 8;

fn decimal_text(value: &Decimal) -> String {
    value.normalize().to_string()
}

impl OhlcFrameDB {
    pub fn from_frame(market: &str, frame: &OhlcFrame) -> Self {
        Self {
            market_id: market.to_string(),
            bucket_start: frame.bucket_start,
            open: decimal_text(&frame.open),
            high: decimal_text(&frame.high),
            low: decimal_text(&frame.low),
            close: decimal_text(&frame.close),
            volume: decimal_text(&frame.volume),
        }
    }
}

impl TryFrom<OhlcFrameDB> for OhlcFrame {
    type Error = Error;

    fn try_from(db: OhlcFrameDB) -> Result<Self, Self::Error> {
        Ok(OhlcFrame {
            bucket_start: db.bucket_start,
            open: Decimal::from_str(&db.open)?,
            high: Decimal::from_str(&db.high)?,
            low: Decimal::from_str(&db.low)?,
            close: Decimal::from_str(&db.close)?,
            volume: Decimal::from_str(&db.volume)?,
        })
    }
}

impl StagedTradeDB {
    /// Rows for `ticks`, given oldest first.
    ///
    /// A tick is keyed by its source id. Ticks without one are keyed by their
    /// timestamp and their position among the ticks sharing it, so a page
    /// staged twice lands on the same rows.
    pub fn from_ticks(market: &str, ticks: &[TradeTick]) -> Vec<Self> {
        let mut rows: Vec<Self> = Vec::with_capacity(ticks.len());
        for tick in ticks {
            let seq = match rows.last() {
                Some(prev) if prev.timestamp == tick.timestamp => prev.seq + 1,
                _ => 0,
            };
            rows.push(Self::from_tick(market, tick, seq));
        }
        rows
    }

    fn from_tick(market: &str, tick: &TradeTick, seq: i64) -> Self {
        let trade_key = match tick.trade_id {
            Some(id) => format!("id:{}", id),
            None => format!("at:{}:{}", tick.timestamp, seq),
        };
        Self {
            market_id: market.to_string(),
            trade_key,
            trade_id: tick.trade_id,
            seq,
            timestamp: tick.timestamp,
            price: decimal_text(&tick.price),
            volume: decimal_text(&tick.volume),
            direction: tick.direction.as_str().to_string(),
        }
    }
}

impl TryFrom<StagedTradeDB> for TradeTick {
    type Error = Error;

    fn try_from(db: StagedTradeDB) -> Result<Self, Self::Error> {
        let direction = TradeDirection::from_str(&db.direction).map_err(|_| {
            Error::from(StorageError::CorruptRow(format!(
                "unknown trade direction '{}'",
                db.direction
            )))
        })?;
        Ok(TradeTick {
            timestamp: db.timestamp,
            price: Decimal::from_str(&db.price)?,
            volume: Decimal::from_str(&db.volume)?,
            direction,
            trade_id: db.trade_id,
        })
    }
}
