//! SQLite storage implementation for Fortacrypt.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the [`OhlcStore`](fortacrypt_core::ohlc::OhlcStore) trait defined in
//! `fortacrypt-core` and contains:
//! - Database connection pooling and the single-writer actor
//! - Diesel migrations
//! - Database-specific model types (with Diesel derives)
//!
//! ```text
//! core (recovery, ohlc)
//!          │
//!          ▼
//!  storage-sqlite (this crate)
//!          │
//!          ▼
//!      SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod ohlc;
pub mod schema;
pub mod utils;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

pub use ohlc::OhlcRepository;

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from fortacrypt-core for convenience
pub use fortacrypt_core::errors::{DatabaseError, Error, Result};
