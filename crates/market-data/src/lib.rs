//! Fortacrypt Market Data Crate
//!
//! This crate fetches raw trade history from exchanges that only expose it
//! through bounded, cursor-paginated endpoints.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |  Recovery loop   |  (fortacrypt-core)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |   PageFetcher    | --> |   TradeSource    |  (URL templating + extraction)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |    TradePage     |  (entries newest first + next cursor)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`TradeTick`] - One executed trade
//! - [`TradePage`] - One bounded page of trades and its cursor metadata
//! - [`TimestampUnit`] - Milliseconds or seconds, fixed per source
//! - [`MarketDataError`] - Fetch failures, classified by [`RetryClass`]

pub mod errors;
pub mod fetcher;
pub mod models;
pub mod provider;

// Re-export all public types from models
pub use models::{MarketId, ProviderId, TimestampUnit, TradeDirection, TradePage, TradeTick};

// Re-export provider types
pub use provider::{BudaSource, TradeSource};

// Re-export fetcher types
pub use fetcher::{HttpPageFetcher, PageFetcher};

// Re-export error types
pub use errors::{MarketDataError, RetryClass};
