#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Durable `DuckDB` storage for the WFPS map.
//!
//! Holds the neighbourhood location cache (the only state that must
//! survive process restarts) and the canonical data-directory paths.

pub mod location_cache;
pub mod paths;

pub use location_cache::LocationCacheDb;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    /// I/O error creating the data directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection mutex was poisoned by a panicking thread.
    #[error("Database connection lock poisoned")]
    LockPoisoned,
}
