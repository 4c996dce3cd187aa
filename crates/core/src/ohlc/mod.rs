//! Hour-bucketed OHLCV frames.
//!
//! - `bucket` - Hour boundary arithmetic
//! - `aggregator` - Trades to frames
//! - `merger` - Frames against the persisted boundary frame
//! - `store` - Persistence interface

mod aggregator;
pub mod bucket;
mod merger;
mod model;
mod store;

pub use aggregator::{aggregate, OhlcAggregator};
pub use bucket::{bucket_end, bucket_start};
pub use merger::{merge, merge_preceding, MergeOutcome};
pub use model::OhlcFrame;
pub use store::OhlcStore;
