//! Fortacrypt Core - Recovery state machine, OHLC aggregation and the traits
//! storage backends implement.
//!
//! This crate is database-agnostic. Pages come in through
//! [`fortacrypt_market_data::PageFetcher`], frames go out through
//! [`ohlc::OhlcStore`] and progress is checkpointed through
//! [`recovery::RecoveryStateStore`].

pub mod config;
pub mod constants;
pub mod errors;
pub mod ohlc;
pub mod recovery;

pub use config::{MarketSettings, RecoveryConfig};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
