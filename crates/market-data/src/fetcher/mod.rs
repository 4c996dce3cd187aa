//! Page fetching.
//!
//! [`PageFetcher`] is the seam the recovery state machine depends on. It performs
//! exactly one request per call and never retries; retry policy belongs to the
//! caller via [`RetryClass`](crate::errors::RetryClass).

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{TimestampUnit, TradePage};
use crate::provider::TradeSource;

/// Default request timeout for source calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches one bounded page of trades older than a cursor.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Identifier of the underlying source.
    fn provider_id(&self) -> &'static str;

    /// Timestamp unit of every page and cursor.
    fn timestamp_unit(&self) -> TimestampUnit;

    /// Requests the page of trades older than `cursor` for `market`.
    ///
    /// `None` requests the most recent page.
    async fn fetch(&self, market: &str, cursor: Option<i64>) -> Result<TradePage, MarketDataError>;
}

/// [`PageFetcher`] over HTTP for any [`TradeSource`].
pub struct HttpPageFetcher<S: TradeSource> {
    client: Client,
    source: S,
}

impl<S: TradeSource> HttpPageFetcher<S> {
    pub fn new(source: S) -> Self {
        Self::with_timeout(source, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(source: S, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn parse_page(&self, body: &str) -> Result<TradePage, MarketDataError> {
        let provider = self.source.id();
        let response: S::Response = serde_json::from_str(body).map_err(|e| {
            MarketDataError::malformed(provider, format!("Failed to parse response: {}", e))
        })?;

        let entries = self.source.extract_entries(&response)?;
        if let Some(pair) = entries.windows(2).find(|w| w[0].timestamp < w[1].timestamp) {
            return Err(MarketDataError::malformed(
                provider,
                format!(
                    "entries not ordered newest first: {} before {}",
                    pair[0].timestamp, pair[1].timestamp
                ),
            ));
        }

        let newest_timestamp = self.source.extract_first_timestamp(&response)?;
        let next_cursor = self.source.extract_last_timestamp(&response)?;

        Ok(TradePage {
            entries,
            newest_timestamp,
            next_cursor,
        })
    }
}

#[async_trait]
impl<S> PageFetcher for HttpPageFetcher<S>
where
    S: TradeSource + 'static,
{
    fn provider_id(&self) -> &'static str {
        self.source.id()
    }

    fn timestamp_unit(&self) -> TimestampUnit {
        self.source.timestamp_unit()
    }

    async fn fetch(&self, market: &str, cursor: Option<i64>) -> Result<TradePage, MarketDataError> {
        let provider = self.source.id();
        let url = self.source.build_request(market, cursor);

        debug!("{} request: {}", provider, url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: provider.to_string(),
                }
            } else {
                MarketDataError::Network(e)
            }
        })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: provider.to_string(),
            });
        }

        if !status.is_success() {
            warn!("{} responded with code: {}", provider, status);
            return Err(MarketDataError::Blocked {
                provider: provider.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: provider.to_string(),
                }
            } else {
                MarketDataError::Network(e)
            }
        })?;

        self.parse_page(&body)
    }
}
