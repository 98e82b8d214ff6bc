//! SQLite storage implementation

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use serde::Serialize;

use super::schema::{self, QUOTE_COLUMNS};
use crate::quote::{Counter, MAX_QUOTES_PER_SOURCE, NewQuote, Quote, ValidationError};
use crate::{Error, Result};

/// Rows fetched per page by [`WeightCursor`]
pub const WEIGHT_PAGE_SIZE: usize = 256;

/// SQLite-backed storage for the quote collection.
///
/// The connection sits behind a mutex: each operation holds it for its own
/// duration, which makes validate-then-write atomic for creates and edits.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        // WAL is not available for every target (in-memory, some network fs)
        if let Err(e) = conn.execute_batch("PRAGMA journal_mode = WAL;") {
            tracing::debug!("WAL journal mode unavailable: {}", e);
        }
        let store = Self { conn: Mutex::new(conn) };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn: Mutex::new(conn) };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(schema::PRAGMAS)?;
        for stmt in schema::all_schema_statements() {
            conn.execute(stmt, [])?;
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }

    /// Cheap round trip used by the health endpoint
    pub fn ping(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    // ========== Validated Writes ==========

    /// Insert a new quote after checking every collection rule
    pub fn create_quote(&self, new: &NewQuote) -> Result<Quote> {
        new.validate_fields()?;

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        check_collection_rules(&tx, new, None)?;

        let now = Utc::now();
        tx.execute(
            "INSERT INTO quotes (text, source, weight, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![new.text, new.source, new.weight, now, now],
        )
        .map_err(map_write_error)?;

        let id = tx.last_insert_rowid();
        let quote = fetch_quote(&tx, id)?.ok_or(Error::QuoteNotFound(id))?;
        tx.commit()?;

        tracing::debug!("Created quote {} ({})", quote.id, quote.source);
        Ok(quote)
    }

    /// Replace the identity fields of an existing quote.
    ///
    /// The quote being edited does not count against its own uniqueness or
    /// source quota, so saving it unchanged always succeeds.
    pub fn update_quote(&self, id: i64, new: &NewQuote) -> Result<Quote> {
        new.validate_fields()?;

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if fetch_quote(&tx, id)?.is_none() {
            return Err(Error::QuoteNotFound(id));
        }
        check_collection_rules(&tx, new, Some(id))?;

        tx.execute(
            "UPDATE quotes SET text = ?1, source = ?2, weight = ?3, updated_at = ?4 WHERE id = ?5",
            params![new.text, new.source, new.weight, Utc::now(), id],
        )
        .map_err(map_write_error)?;

        let quote = fetch_quote(&tx, id)?.ok_or(Error::QuoteNotFound(id))?;
        tx.commit()?;

        tracing::debug!("Updated quote {} ({})", quote.id, quote.source);
        Ok(quote)
    }

    /// Add one to a counter in a single UPDATE, so concurrent bumps are never lost
    pub fn increment_counter(&self, id: i64, counter: Counter) -> Result<()> {
        let column = counter.as_str();
        let sql = format!(
            "UPDATE quotes SET {column} = {column} + 1, updated_at = ?1 WHERE id = ?2"
        );

        let conn = self.lock()?;
        let changed = conn.execute(&sql, params![Utc::now(), id])?;
        if changed == 0 {
            return Err(Error::QuoteNotFound(id));
        }
        Ok(())
    }

    /// Delete a quote (administrative action)
    pub fn delete_quote(&self, id: i64) -> Result<()> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM quotes WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(Error::QuoteNotFound(id));
        }
        tracing::debug!("Deleted quote {}", id);
        Ok(())
    }

    // ========== Queries ==========

    /// Get a quote by id
    pub fn get_quote(&self, id: i64) -> Result<Option<Quote>> {
        let conn = self.lock()?;
        fetch_quote(&conn, id)
    }

    /// Count quotes attributed to `source`, optionally ignoring one id
    pub fn count_by_source(&self, source: &str, excluding: Option<i64>) -> Result<i64> {
        let conn = self.lock()?;
        count_by_source(&conn, source, excluding)
    }

    /// Whether the `(text, source)` pair is taken, optionally ignoring one id
    pub fn exists_by_text_source(&self, text: &str, source: &str, excluding: Option<i64>) -> Result<bool> {
        let conn = self.lock()?;
        exists_by_text_source(&conn, text, source, excluding)
    }

    /// Sum of all weights (0 for an empty store)
    pub fn sum_weights(&self) -> Result<i64> {
        let conn = self.lock()?;
        let total: i64 = conn.query_row("SELECT COALESCE(SUM(weight), 0) FROM quotes", [], |row| row.get(0))?;
        Ok(total)
    }

    /// Lazily walk `(id, weight)` pairs in ascending id order.
    ///
    /// Every call starts a fresh walk. Pages are read on demand and the lock
    /// is released between pages, so writes may land mid-walk.
    pub fn weights_by_id(&self) -> WeightCursor<'_> {
        WeightCursor::new(self, WEIGHT_PAGE_SIZE)
    }

    /// Same as [`weights_by_id`](Self::weights_by_id) with an explicit page size
    pub fn weights_by_id_paged(&self, page_size: usize) -> WeightCursor<'_> {
        WeightCursor::new(self, page_size.max(1))
    }

    fn weight_page(&self, after: Option<i64>, limit: usize) -> Result<Vec<WeightRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, weight FROM quotes WHERE (?1 IS NULL OR id > ?1) ORDER BY id LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![after, limit as i64], |row| {
                Ok(WeightRow { id: row.get(0)?, weight: row.get(1)? })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// The quote with the largest weight, lowest id first on ties
    pub fn heaviest_quote(&self) -> Result<Option<Quote>> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {QUOTE_COLUMNS} FROM quotes ORDER BY weight DESC, id ASC LIMIT 1"),
            [],
            row_to_quote,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Quotes ordered by likes, then views (both descending), optionally for one source
    pub fn top_by_popularity(&self, source: Option<&str>, limit: usize) -> Result<Vec<Quote>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes
             WHERE (?1 IS NULL OR source = ?1)
             ORDER BY likes DESC, views DESC, id ASC
             LIMIT ?2"
        ))?;

        let quotes = stmt
            .query_map(params![source, limit as i64], row_to_quote)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(quotes)
    }

    /// Case-insensitive substring search over text and source
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<Quote>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes
             WHERE instr(lower(text), lower(?1)) > 0 OR instr(lower(source), lower(?1)) > 0
             ORDER BY id
             LIMIT ?2"
        ))?;

        let quotes = stmt
            .query_map(params![query, limit as i64], row_to_quote)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(quotes)
    }

    /// Every source with the number of quotes attributed to it
    pub fn list_sources(&self) -> Result<Vec<SourceCount>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT source, COUNT(*) FROM quotes GROUP BY source ORDER BY source",
        )?;

        let sources = stmt
            .query_map([], |row| Ok(SourceCount { source: row.get(0)?, count: row.get(1)? }))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sources)
    }

    /// Count all quotes
    pub fn count_quotes(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM quotes", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        let conn = self.lock()?;
        let stats = conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT source), COALESCE(SUM(weight), 0),
                    COALESCE(SUM(views), 0), COALESCE(SUM(likes), 0), COALESCE(SUM(dislikes), 0)
             FROM quotes",
            [],
            |row| {
                Ok(DbStats {
                    quotes: row.get::<_, i64>(0)? as usize,
                    sources: row.get::<_, i64>(1)? as usize,
                    total_weight: row.get(2)?,
                    views: row.get(3)?,
                    likes: row.get(4)?,
                    dislikes: row.get(5)?,
                })
            },
        )?;
        Ok(stats)
    }
}

// ========== Connection-level helpers ==========
//
// These take a plain connection so they can run inside a write transaction
// without re-locking the store.

fn check_collection_rules(conn: &Connection, new: &NewQuote, excluding: Option<i64>) -> Result<()> {
    if exists_by_text_source(conn, &new.text, &new.source, excluding)? {
        return Err(ValidationError::DuplicateQuote.into());
    }
    if count_by_source(conn, &new.source, excluding)? >= MAX_QUOTES_PER_SOURCE {
        return Err(ValidationError::SourceQuotaExceeded.into());
    }
    Ok(())
}

fn count_by_source(conn: &Connection, source: &str, excluding: Option<i64>) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM quotes WHERE source = ?1 AND (?2 IS NULL OR id != ?2)",
        params![source, excluding],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn exists_by_text_source(conn: &Connection, text: &str, source: &str, excluding: Option<i64>) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM quotes WHERE text = ?1 AND source = ?2 AND (?3 IS NULL OR id != ?3))",
        params![text, source, excluding],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn fetch_quote(conn: &Connection, id: i64) -> Result<Option<Quote>> {
    conn.query_row(
        &format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = ?1"),
        [id],
        row_to_quote,
    )
    .optional()
    .map_err(Into::into)
}

/// Helper to convert a row to a Quote
fn row_to_quote(row: &rusqlite::Row) -> rusqlite::Result<Quote> {
    Ok(Quote {
        id: row.get(0)?,
        text: row.get(1)?,
        source: row.get(2)?,
        weight: row.get(3)?,
        views: row.get(4)?,
        likes: row.get(5)?,
        dislikes: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// A UNIQUE(text, source) hit means a duplicate slipped past the pre-check
fn map_write_error(err: rusqlite::Error) -> Error {
    if let rusqlite::Error::SqliteFailure(code, _) = &err {
        if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
            return ValidationError::DuplicateQuote.into();
        }
    }
    Error::Storage(err)
}

/// One `(id, weight)` pair from the weight walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightRow {
    pub id: i64,
    pub weight: i64,
}

/// Keyset-paged walk over quote weights in ascending id order
pub struct WeightCursor<'a> {
    store: &'a SqliteStore,
    after: Option<i64>,
    page: std::vec::IntoIter<WeightRow>,
    page_size: usize,
    exhausted: bool,
}

impl<'a> WeightCursor<'a> {
    fn new(store: &'a SqliteStore, page_size: usize) -> Self {
        Self {
            store,
            after: None,
            page: Vec::new().into_iter(),
            page_size,
            exhausted: false,
        }
    }
}

impl Iterator for WeightCursor<'_> {
    type Item = Result<WeightRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.page.next() {
                self.after = Some(row.id);
                return Some(Ok(row));
            }
            if self.exhausted {
                return None;
            }

            match self.store.weight_page(self.after, self.page_size) {
                Ok(rows) => {
                    // A short page is the last one
                    if rows.len() < self.page_size {
                        self.exhausted = true;
                    }
                    if rows.is_empty() {
                        return None;
                    }
                    self.page = rows.into_iter();
                }
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// A source and how many quotes reference it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub count: i64,
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct DbStats {
    pub quotes: usize,
    pub sources: usize,
    pub total_weight: i64,
    pub views: i64,
    pub likes: i64,
    pub dislikes: i64,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Quotes: {}", self.quotes)?;
        writeln!(f, "  Sources: {}", self.sources)?;
        writeln!(f, "  Total weight: {}", self.total_weight)?;
        writeln!(f, "  Views: {}", self.views)?;
        writeln!(f, "  Likes: {}", self.likes)?;
        writeln!(f, "  Dislikes: {}", self.dislikes)
    }
}
