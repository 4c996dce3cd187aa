//! Trade source trait definitions.
//!
//! This module defines the `TradeSource` trait that tells the generic
//! HTTP fetcher how to talk to one particular exchange.

use serde::de::DeserializeOwned;

use crate::errors::MarketDataError;
use crate::models::{ProviderId, TimestampUnit, TradeTick};

/// Trait for paginated trade sources.
///
/// A source knows how to build the request URL for a market and cursor, and
/// how to pull the page metadata and entries out of its own response body.
/// Everything else (HTTP, status handling, ordering checks) lives in
/// [`HttpPageFetcher`](crate::fetcher::HttpPageFetcher).
///
/// # Example
///
/// ```ignore
/// use fortacrypt_market_data::provider::TradeSource;
///
/// struct MyExchange;
///
/// impl TradeSource for MyExchange {
///     type Response = MyTradesBody;
///
///     fn id(&self) -> &'static str {
///         "MY_EXCHANGE"
///     }
///
///     fn build_request(&self, market: &str, cursor: Option<i64>) -> String {
///         format!("https://example.com/{}/trades?before={}", market, cursor.unwrap_or(0))
///     }
///
///     // ... implement the extractors
/// }
/// ```
pub trait TradeSource: Send + Sync {
    /// Typed body of one trades response.
    type Response: DeserializeOwned + Send;

    /// Unique identifier for this source, used in logs and errors.
    fn id(&self) -> ProviderId;

    /// Unit of the timestamps in responses and cursors.
    fn timestamp_unit(&self) -> TimestampUnit {
        TimestampUnit::Milliseconds
    }

    /// Full URL for the page of trades older than `cursor`.
    ///
    /// `None` asks for the most recent page.
    fn build_request(&self, market: &str, cursor: Option<i64>) -> String;

    /// Timestamp of the newest entry in the response.
    ///
    /// `None` when the response carries no entries.
    fn extract_first_timestamp(
        &self,
        response: &Self::Response,
    ) -> Result<Option<i64>, MarketDataError>;

    /// Cursor to request the next older page with.
    ///
    /// `None` when the source reports nothing older.
    fn extract_last_timestamp(
        &self,
        response: &Self::Response,
    ) -> Result<Option<i64>, MarketDataError>;

    /// All trades in the response, newest first.
    fn extract_entries(&self, response: &Self::Response) -> Result<Vec<TradeTick>, MarketDataError>;
}
