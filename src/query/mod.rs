pub mod engine;
pub mod selector;

pub use engine::{DEFAULT_POPULAR_LIMIT, QuoteEngine};
pub use selector::{WeightSource, pick_weighted_quote};
