use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Side of the taker in an executed trade.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl TradeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeDirection::Buy => "buy",
            TradeDirection::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(TradeDirection::Buy),
            "sell" => Ok(TradeDirection::Sell),
            other => Err(format!("Unknown trade direction: {}", other)),
        }
    }
}

/// A single executed trade as reported by a source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeTick {
    /// Execution time in the source's [`TimestampUnit`](super::TimestampUnit)
    pub timestamp: i64,
    pub price: Decimal,
    pub volume: Decimal,
    pub direction: TradeDirection,

    /// Identifier assigned by the source, when it reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_id: Option<i64>,
}

impl TradeTick {
    pub fn new(timestamp: i64, price: Decimal, volume: Decimal, direction: TradeDirection) -> Self {
        Self {
            timestamp,
            price,
            volume,
            direction,
            trade_id: None,
        }
    }

    pub fn with_trade_id(mut self, trade_id: i64) -> Self {
        self.trade_id = Some(trade_id);
        self
    }
}

/// One bounded page of trades, older than the cursor it was requested with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TradePage {
    /// Entries ordered newest first, as sources return them
    pub entries: Vec<TradeTick>,

    /// Timestamp of the newest entry, `None` for an empty page
    pub newest_timestamp: Option<i64>,

    /// Cursor for the next older page, `None` when the source has nothing older
    pub next_cursor: Option<i64>,
}

impl TradePage {
    /// A page with nothing in it or nothing behind it ends a backward walk.
    pub fn is_exhausted(&self) -> bool {
        self.entries.is_empty() || self.next_cursor.is_none()
    }

    pub fn oldest_timestamp(&self) -> Option<i64> {
        self.entries.last().map(|tick| tick.timestamp)
    }

    /// Entries re-ordered oldest first, ready for aggregation.
    pub fn ascending(&self) -> Vec<TradeTick> {
        self.entries.iter().rev().cloned().collect()
    }
}
