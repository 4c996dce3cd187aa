//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The error enum for every trade page fetch
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while fetching trade pages from a source.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method, which tells the recovery loop whether to back off and retry the same cursor.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The source answered with a non-success HTTP status.
    /// Usually a temporary block from an upstream firewall.
    #[error("Blocked by {provider}: HTTP {status}")]
    Blocked {
        /// The source that refused the request
        provider: String,
        /// The HTTP status code returned
        status: u16,
    },

    /// The source rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The source that rate limited the request
        provider: String,
    },

    /// The request to the source timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The source that timed out
        provider: String,
    },

    /// The source answered but the body did not have the expected shape.
    /// Retrying will return the same body, so this is terminal.
    #[error("Malformed response from {provider}: {message}")]
    MalformedResponse {
        /// The source that returned the body
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// A network error occurred while communicating with a source.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Shorthand for building a [`MarketDataError::MalformedResponse`].
    pub fn malformed(provider: &str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Returns the retry classification for this error.
    ///
    /// - [`RetryClass::Never`]: the error is terminal for the recovery cycle
    /// - [`RetryClass::WithBackoff`]: sleep the blocked backoff, then retry the same cursor
    ///
    /// # Examples
    ///
    /// ```
    /// use fortacrypt_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "BUDA".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = MarketDataError::malformed("BUDA", "missing trades");
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::MalformedResponse { .. } => RetryClass::Never,

            // Transport conditions - the cursor is still valid
            Self::Blocked { .. }
            | Self::RateLimited { .. }
            | Self::Timeout { .. }
            | Self::Network(_) => RetryClass::WithBackoff,
        }
    }
}
