//! SQLite storage implementation for OHLC frames and staged trades.

mod model;
mod repository;

pub use model::{OhlcFrameDB, StagedTradeDB};
pub use repository::OhlcRepository;

// Re-export trait from core for convenience
pub use fortacrypt_core::ohlc::OhlcStore;
