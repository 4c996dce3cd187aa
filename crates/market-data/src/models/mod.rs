//! Market data models
//!
//! This module contains the data types exchanged with trade sources:
//! - `types` - Identifier aliases and the per-source timestamp unit
//! - `trade` - Trade ticks and the pages they arrive in

mod trade;
mod types;

pub use trade::{TradeDirection, TradePage, TradeTick};
pub use types::{MarketId, ProviderId, TimestampUnit};
