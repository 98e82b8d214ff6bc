//! Quote types
//!
//! A quote is a short piece of text attributed to a source. Three rules hold
//! for the whole collection after every committed write:
//! - no two quotes share the same `(text, source)` pair
//! - a source is referenced by at most [`MAX_QUOTES_PER_SOURCE`] quotes
//! - every weight is at least [`MIN_WEIGHT`]
//!
//! The per-record checks live here; the cross-record checks need the store
//! and run inside its write transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of quotes attributed to a single source
pub const MAX_QUOTES_PER_SOURCE: i64 = 3;

/// Smallest weight a quote may carry
pub const MIN_WEIGHT: i64 = 1;

/// Largest weight a quote may carry. Keeps `SUM(weight)` far from i64 overflow.
pub const MAX_WEIGHT: i64 = i32::MAX as i64;

/// Maximum length of a source name, in characters
pub const MAX_SOURCE_LEN: usize = 255;

/// Why a create or edit was rejected.
///
/// Every variant is recoverable: the caller shows the message next to
/// [`ValidationError::field`] and asks again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Quote text must not be empty.")]
    EmptyText,

    #[error("Source must not be empty.")]
    EmptySource,

    #[error("Source must be at most 255 characters.")]
    SourceTooLong,

    #[error("Weight must be greater than or equal to 1.")]
    WeightTooLow,

    #[error("Weight must be less than or equal to 2147483647.")]
    WeightTooHigh,

    #[error("This field is required.")]
    Required(&'static str),

    #[error("This quote from the same source already exists.")]
    DuplicateQuote,

    #[error("A single source cannot have more than 3 quotes.")]
    SourceQuotaExceeded,
}

impl ValidationError {
    /// Form field the error belongs to, `None` for errors spanning fields
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::EmptyText => Some("text"),
            ValidationError::EmptySource | ValidationError::SourceTooLong => Some("source"),
            ValidationError::WeightTooLow | ValidationError::WeightTooHigh => Some("weight"),
            ValidationError::Required(field) => Some(*field),
            ValidationError::DuplicateQuote | ValidationError::SourceQuotaExceeded => None,
        }
    }
}

/// Counters bumped independently of the quote's identity fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Counter {
    Views,
    Likes,
    Dislikes,
}

impl Counter {
    /// Column name of the counter in the quotes table
    pub fn as_str(&self) -> &'static str {
        match self {
            Counter::Views => "views",
            Counter::Likes => "likes",
            Counter::Dislikes => "dislikes",
        }
    }
}

impl std::fmt::Display for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The editable fields of a quote, as submitted by a form or the CLI.
///
/// Text and source are trimmed on construction so that `"Heat "` and
/// `"Heat"` name the same source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewQuote {
    pub text: String,
    pub source: String,
    pub weight: i64,
}

impl NewQuote {
    pub fn new(text: impl Into<String>, source: impl Into<String>, weight: i64) -> Self {
        Self {
            text: text.into().trim().to_string(),
            source: source.into().trim().to_string(),
            weight,
        }
    }

    /// Checks that need nothing but the record itself
    pub fn validate_fields(&self) -> std::result::Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if self.source.trim().is_empty() {
            return Err(ValidationError::EmptySource);
        }
        if self.source.chars().count() > MAX_SOURCE_LEN {
            return Err(ValidationError::SourceTooLong);
        }
        if self.weight < MIN_WEIGHT {
            return Err(ValidationError::WeightTooLow);
        }
        if self.weight > MAX_WEIGHT {
            return Err(ValidationError::WeightTooHigh);
        }
        Ok(())
    }
}

/// A stored quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: i64,
    pub text: String,
    pub source: String,
    pub weight: i64,
    pub views: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// First `max_chars` characters of the text
    pub fn short_text(&self, max_chars: usize) -> String {
        self.text.chars().take(max_chars).collect()
    }
}

impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.text.is_empty() {
            write!(f, "{}", self.source)
        } else {
            write!(f, "{}: {}", self.source, self.short_text(50))
        }
    }
}
