//! Trade sources.
//!
//! - `traits` - The [`TradeSource`] trait every exchange implements
//! - `buda` - Buda.com public trades API

pub mod buda;
mod traits;

pub use buda::BudaSource;
pub use traits::TradeSource;
