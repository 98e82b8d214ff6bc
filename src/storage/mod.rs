//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite table:
//! - quotes(id, text, source, weight, views, likes, dislikes, created_at, updated_at)
//!
//! Every write that touches `text`, `source` or `weight` is validated and
//! committed in one IMMEDIATE transaction.

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, SourceCount, SqliteStore, WeightCursor, WeightRow};
