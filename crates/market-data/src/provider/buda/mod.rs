//! Buda.com public trades source.
//!
//! Buda exposes `GET /api/v2/markets/{market}/trades.json`, returning at most
//! `limit` trades older than the optional `timestamp` cursor, newest first.
//! Entries are positional arrays `[timestamp, amount, price, direction, id]`
//! where numbers may arrive as JSON strings.

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

use crate::errors::MarketDataError;
use crate::models::{ProviderId, TimestampUnit, TradeDirection, TradeTick};
use crate::provider::TradeSource;

pub const DEFAULT_BASE_URL: &str = "https://www.buda.com/api/v2/markets/";
pub const DEFAULT_PAGE_SIZE: u32 = 100;
const PROVIDER_ID: &str = "BUDA";

const TIMESTAMP_INDEX: usize = 0;
const AMOUNT_INDEX: usize = 1;
const PRICE_INDEX: usize = 2;
const DIRECTION_INDEX: usize = 3;
const ID_INDEX: usize = 4;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BudaTradesResponse {
    trades: BudaTrades,
}

#[derive(Debug, Deserialize)]
struct BudaTrades {
    // Required key, but null once the history is exhausted
    #[serde(deserialize_with = "nullable_timestamp")]
    last_timestamp: Option<i64>,
    #[serde(default)]
    entries: Option<Vec<Vec<Value>>>,
}

fn nullable_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        other => parse_integer(&other)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", other))),
    }
}

fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

// ============================================================================
// BudaSource
// ============================================================================

/// Buda.com trade source.
///
/// Timestamps are milliseconds since the epoch.
#[derive(Clone, Debug)]
pub struct BudaSource {
    base_url: String,
    page_size: u32,
}

impl Default for BudaSource {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE)
    }
}

impl BudaSource {
    pub fn new(base_url: impl Into<String>, page_size: u32) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            base_url,
            page_size,
        }
    }

    fn entries<'a>(&self, response: &'a BudaTradesResponse) -> &'a [Vec<Value>] {
        response.trades.entries.as_deref().unwrap_or(&[])
    }

    fn parse_entry(&self, position: usize, entry: &[Value]) -> Result<TradeTick, MarketDataError> {
        if entry.len() <= DIRECTION_INDEX {
            return Err(MarketDataError::malformed(
                PROVIDER_ID,
                format!("entry {} has {} fields", position, entry.len()),
            ));
        }

        let timestamp = parse_integer(&entry[TIMESTAMP_INDEX]).ok_or_else(|| {
            MarketDataError::malformed(
                PROVIDER_ID,
                format!("entry {} has an invalid timestamp", position),
            )
        })?;
        let volume = parse_decimal(&entry[AMOUNT_INDEX]).ok_or_else(|| {
            MarketDataError::malformed(PROVIDER_ID, format!("entry {} has an invalid amount", position))
        })?;
        let price = parse_decimal(&entry[PRICE_INDEX]).ok_or_else(|| {
            MarketDataError::malformed(PROVIDER_ID, format!("entry {} has an invalid price", position))
        })?;
        let direction = entry[DIRECTION_INDEX]
            .as_str()
            .ok_or_else(|| {
                MarketDataError::malformed(
                    PROVIDER_ID,
                    format!("entry {} has a non-string direction", position),
                )
            })?
            .parse::<TradeDirection>()
            .map_err(|e| MarketDataError::malformed(PROVIDER_ID, format!("entry {}: {}", position, e)))?;

        let tick = TradeTick::new(timestamp, price, volume, direction);
        Ok(match entry.get(ID_INDEX).and_then(parse_integer) {
            Some(id) => tick.with_trade_id(id),
            None => tick,
        })
    }
}

impl TradeSource for BudaSource {
    type Response = BudaTradesResponse;

    fn id(&self) -> ProviderId {
        PROVIDER_ID
    }

    fn timestamp_unit(&self) -> TimestampUnit {
        TimestampUnit::Milliseconds
    }

    fn build_request(&self, market: &str, cursor: Option<i64>) -> String {
        let mut url = format!(
            "{}{}/trades.json?limit={}",
            self.base_url, market, self.page_size
        );
        if let Some(cursor) = cursor {
            url.push_str(&format!("&timestamp={}", cursor));
        }
        url
    }

    fn extract_first_timestamp(
        &self,
        response: &Self::Response,
    ) -> Result<Option<i64>, MarketDataError> {
        match self.entries(response).first() {
            Some(entry) => entry
                .get(TIMESTAMP_INDEX)
                .and_then(parse_integer)
                .map(Some)
                .ok_or_else(|| {
                    MarketDataError::malformed(PROVIDER_ID, "first entry has an invalid timestamp")
                }),
            None => Ok(None),
        }
    }

    fn extract_last_timestamp(
        &self,
        response: &Self::Response,
    ) -> Result<Option<i64>, MarketDataError> {
        Ok(response.trades.last_timestamp)
    }

    fn extract_entries(&self, response: &Self::Response) -> Result<Vec<TradeTick>, MarketDataError> {
        let entries = self
            .entries(response)
            .iter()
            .enumerate()
            .map(|(position, entry)| self.parse_entry(position, entry))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Buda response parsed: {} entries", entries.len());
        Ok(entries)
    }
}
