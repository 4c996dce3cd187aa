//! Incremental recovery of trade history.
//!
//! This module contains:
//! - `state` - Persisted per-market progress and its transition rules
//! - `state_store` - Durable storage for that progress
//! - `sink` - Page to frame persistence
//! - `machine` - The backfill / catch-up state machine
//! - `worker` - The per-market long-running loop

mod machine;
mod sink;
mod state;
mod state_store;
mod worker;


pub use machine::{Action, RecoveryStateMachine};
pub use sink::FrameWriter;
pub use state::{RecoveryMode, RecoveryState};
pub use state_store::{JsonFileStateStore, RecoveryStateStore};
pub use worker::MarketWorker;
