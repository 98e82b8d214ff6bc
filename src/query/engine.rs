//! Quote engine
//!
//! The operations the HTTP server and the CLI call into:
//! - Add and edit quotes (validated by the store)
//! - Weighted random pick, with one view counted per display
//! - Like / dislike counters
//! - Popularity ranking, source listing, search

use rand::Rng;

use super::selector::pick_weighted_quote;
use crate::quote::{Counter, NewQuote, Quote};
use crate::storage::{DbStats, SourceCount, SqliteStore};
use crate::{Error, Result};

/// Number of quotes on the popular list when the caller gives no limit
pub const DEFAULT_POPULAR_LIMIT: usize = 10;

/// Facade over the quote store
pub struct QuoteEngine<'a> {
    store: &'a SqliteStore,
}

impl<'a> QuoteEngine<'a> {
    /// Create a new quote engine
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    pub fn add_quote(&self, new: &NewQuote) -> Result<Quote> {
        let quote = self.store.create_quote(new)?;
        tracing::info!("Added quote {} from {:?}", quote.id, quote.source);
        Ok(quote)
    }

    pub fn edit_quote(&self, id: i64, new: &NewQuote) -> Result<Quote> {
        let quote = self.store.update_quote(id, new)?;
        tracing::info!("Edited quote {}", quote.id);
        Ok(quote)
    }

    /// Get a quote or fail with [`Error::QuoteNotFound`]
    pub fn get_quote(&self, id: i64) -> Result<Quote> {
        self.store.get_quote(id)?.ok_or(Error::QuoteNotFound(id))
    }

    /// Weighted random pick. Does not count a view.
    pub fn pick_random_quote(&self) -> Result<Option<Quote>> {
        self.pick_random_quote_with(&mut rand::thread_rng())
    }

    pub fn pick_random_quote_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Option<Quote>> {
        pick_weighted_quote(self.store, rng)
    }

    /// Count one view of a displayed quote
    pub fn view_quote(&self, id: i64) -> Result<()> {
        self.store.increment_counter(id, Counter::Views)
    }

    /// Pick a quote for display and count the view.
    ///
    /// The returned quote reflects the new view count. A quote deleted
    /// between the pick and the view is still shown.
    pub fn display_random_quote(&self) -> Result<Option<Quote>> {
        let Some(mut quote) = self.pick_random_quote()? else {
            return Ok(None);
        };

        match self.view_quote(quote.id) {
            Ok(()) => quote.views += 1,
            Err(e) if e.is_not_found() => {
                tracing::debug!("Quote {} deleted before its view was counted", quote.id);
            }
            Err(e) => return Err(e),
        }
        Ok(Some(quote))
    }

    /// Count a like and return the updated quote
    pub fn like_quote(&self, id: i64) -> Result<Quote> {
        self.bump(id, Counter::Likes)
    }

    /// Count a dislike and return the updated quote
    pub fn dislike_quote(&self, id: i64) -> Result<Quote> {
        self.bump(id, Counter::Dislikes)
    }

    fn bump(&self, id: i64, counter: Counter) -> Result<Quote> {
        self.store.increment_counter(id, counter)?;
        tracing::debug!("Quote {}: {} +1", id, counter);
        self.get_quote(id)
    }

    /// Most liked quotes (ties broken by views), optionally for a single source
    pub fn list_popular(&self, source: Option<&str>, limit: usize) -> Result<Vec<Quote>> {
        let source = source.map(str::trim).filter(|s| !s.is_empty());
        self.store.top_by_popularity(source, limit)
    }

    pub fn delete_quote(&self, id: i64) -> Result<()> {
        self.store.delete_quote(id)?;
        tracing::info!("Deleted quote {}", id);
        Ok(())
    }

    pub fn sources(&self) -> Result<Vec<SourceCount>> {
        self.store.list_sources()
    }

    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<Quote>> {
        self.store.search(query.trim(), limit)
    }

    pub fn stats(&self) -> Result<DbStats> {
        self.store.stats()
    }
}
