//! # Quotebook - weighted random quotes
//!
//! Stores short quotations attributed to a source (a film, a book, a person)
//! and serves one at a time, picked at random with probability proportional
//! to each quote's weight.
//!
//! Quotebook provides:
//! - SQLite-backed quote store that enforces the collection invariants
//!   (unique text per source, at most three quotes per source, weight >= 1)
//! - Weighted selector tolerant of rows vanishing mid-scan
//! - Like/dislike/view counters updated atomically in SQL
//! - Popularity ranking, JSON HTTP server and a CLI

pub mod quote;
pub mod storage;
pub mod query;
pub mod server;
pub mod output;
pub mod config;
pub mod ui;


// Re-exports for convenient access
pub use quote::{Counter, NewQuote, Quote, ValidationError};
pub use query::{QuoteEngine, WeightSource, pick_weighted_quote};
pub use storage::SqliteStore;

/// Result type alias for Quotebook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Quotebook operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Quote not found: {0}")]
    QuoteNotFound(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// True for errors the caller can recover from by re-prompting the user
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::QuoteNotFound(_))
    }
}
