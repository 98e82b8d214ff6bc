//! Weighted random selection
//!
//! Picks one quote with probability `weight / sum(weights)` by drawing a
//! target in `[1, total]` and walking the weights in id order until the
//! running sum reaches it. Linear in the number of quotes.
//!
//! A candidate can be deleted between the walk and the fetch. That is not an
//! error: the walk simply moves on to the next row with the same running sum
//! and target. If the walk ends empty-handed the heaviest quote is returned
//! instead, which is a pragmatic fallback and not a correct weighted draw.

use rand::Rng;

use crate::Result;
use crate::quote::Quote;
use crate::storage::{SqliteStore, WeightRow};

/// Read access the selector needs from a quote collection
pub trait WeightSource {
    /// Sum of all weights, 0 when empty
    fn sum_weights(&self) -> Result<i64>;

    /// Fresh walk over `(id, weight)` in ascending id order
    fn weights_by_id(&self) -> Box<dyn Iterator<Item = Result<WeightRow>> + '_>;

    /// Fetch a quote, `None` if it no longer exists
    fn fetch(&self, id: i64) -> Result<Option<Quote>>;

    /// Highest-weight quote, used when the walk produces nothing
    fn heaviest(&self) -> Result<Option<Quote>>;
}

impl WeightSource for SqliteStore {
    fn sum_weights(&self) -> Result<i64> {
        SqliteStore::sum_weights(self)
    }

    fn weights_by_id(&self) -> Box<dyn Iterator<Item = Result<WeightRow>> + '_> {
        Box::new(SqliteStore::weights_by_id(self))
    }

    fn fetch(&self, id: i64) -> Result<Option<Quote>> {
        self.get_quote(id)
    }

    fn heaviest(&self) -> Result<Option<Quote>> {
        self.heaviest_quote()
    }
}

/// Pick a quote at random, weighted by `weight`.
///
/// Returns `Ok(None)` only when there is nothing to pick from.
pub fn pick_weighted_quote<S, R>(source: &S, rng: &mut R) -> Result<Option<Quote>>
where
    S: WeightSource + ?Sized,
    R: Rng + ?Sized,
{
    let total = source.sum_weights()?;
    if total <= 0 {
        return Ok(None);
    }

    let target = rng.gen_range(1..=total);
    let mut cumulative = 0i64;

    for row in source.weights_by_id() {
        let row = row?;
        // Rows inserted mid-walk can push the sum past the total read above
        cumulative = cumulative.saturating_add(row.weight);
        if cumulative < target {
            continue;
        }

        match source.fetch(row.id)? {
            Some(quote) => return Ok(Some(quote)),
            None => {
                tracing::debug!("Quote {} vanished during weighted scan, skipping", row.id);
                continue;
            }
        }
    }

    tracing::debug!("Weighted scan produced no quote (target {}/{}), using heaviest", target, total);
    source.heaviest()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{MAX_WEIGHT, NewQuote};
    use chrono::Utc;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::Cell;
    use std::collections::{HashMap, HashSet};

    /// In-memory source whose `vanished` ids show up in the walk but can't be fetched
    struct ScriptedSource {
        rows: Vec<WeightRow>,
        vanished: HashSet<i64>,
        heaviest: Option<Quote>,
        sum_calls: Cell<usize>,
    }

    impl ScriptedSource {
        fn new(weights: &[(i64, i64)], vanished: &[i64]) -> Self {
            Self {
                rows: weights.iter().map(|&(id, weight)| WeightRow { id, weight }).collect(),
                vanished: vanished.iter().copied().collect(),
                heaviest: None,
                sum_calls: Cell::new(0),
            }
        }
    }

    fn quote(id: i64, weight: i64) -> Quote {
        let now = Utc::now();
        Quote {
            id,
            text: format!("quote {id}"),
            source: format!("source {id}"),
            weight,
            views: 0,
            likes: 0,
            dislikes: 0,
            created_at: now,
            updated_at: now,
        }
    }

    impl WeightSource for ScriptedSource {
        fn sum_weights(&self) -> Result<i64> {
            self.sum_calls.set(self.sum_calls.get() + 1);
            Ok(self.rows.iter().map(|r| r.weight).sum())
        }

        fn weights_by_id(&self) -> Box<dyn Iterator<Item = Result<WeightRow>> + '_> {
            Box::new(self.rows.iter().copied().map(Ok))
        }

        fn fetch(&self, id: i64) -> Result<Option<Quote>> {
            if self.vanished.contains(&id) {
                return Ok(None);
            }
            Ok(self.rows.iter().find(|r| r.id == id).map(|r| quote(r.id, r.weight)))
        }

        fn heaviest(&self) -> Result<Option<Quote>> {
            Ok(self.heaviest.clone())
        }
    }

    fn draw_counts(store: &SqliteStore, draws: usize, seed: u64) -> HashMap<String, usize> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut counts = HashMap::new();
        for _ in 0..draws {
            let picked = pick_weighted_quote(store, &mut rng).unwrap().unwrap();
            *counts.entry(picked.text).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_empty_store_returns_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            assert!(pick_weighted_quote(&store, &mut rng).unwrap().is_none());
        }
    }

    #[test]
    fn test_single_quote_always_picked() {
        let store = SqliteStore::open_in_memory().unwrap();
        let only = store.create_quote(&NewQuote::new("only", "S", 3)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(pick_weighted_quote(&store, &mut rng).unwrap().unwrap().id, only.id);
        }
    }

    #[test]
    fn test_counts_follow_weights() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_quote(&NewQuote::new("A", "S1", 1)).unwrap();
        store.create_quote(&NewQuote::new("B", "S2", 3)).unwrap();
        store.create_quote(&NewQuote::new("C", "S3", 6)).unwrap();

        let counts = draw_counts(&store, 1000, 42);
        let (a, b, c) = (counts["A"], counts["B"], counts["C"]);
        assert_eq!(a + b + c, 1000);
        assert!(c > b && b > a, "expected C > B > A, got {c} {b} {a}");
    }

    #[test]
    fn test_frequency_ordering_matches_weight_ordering() {
        let store = SqliteStore::open_in_memory().unwrap();
        // Inserted out of weight order so id order and weight order differ
        for (text, weight) in [("w4", 4), ("w1", 1), ("w8", 8), ("w2", 2)] {
            store.create_quote(&NewQuote::new(text, text, weight)).unwrap();
        }

        let counts = draw_counts(&store, 3000, 2024);
        let ordered: Vec<usize> = ["w1", "w2", "w4", "w8"]
            .iter()
            .map(|t| counts.get(*t).copied().unwrap_or(0))
            .collect();
        assert!(ordered.windows(2).all(|w| w[0] < w[1]), "counts not monotonic: {ordered:?}");
    }

    #[test]
    fn test_vanished_candidate_continues_scan() {
        // Whatever the target, rows 1 and 2 are gone and row 3 is the next one reached
        let source = ScriptedSource::new(&[(1, 1), (2, 1), (3, 1)], &[1, 2]);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = pick_weighted_quote(&source, &mut rng).unwrap().unwrap();
            assert_eq!(picked.id, 3);
        }
        // No redraw: one sum per pick
        assert_eq!(source.sum_calls.get(), 20);
    }

    #[test]
    fn test_all_candidates_vanished_falls_back_to_heaviest() {
        let mut source = ScriptedSource::new(&[(1, 1), (2, 5)], &[1, 2]);
        source.heaviest = Some(quote(9, 7));

        let mut rng = StdRng::seed_from_u64(3);
        let picked = pick_weighted_quote(&source, &mut rng).unwrap().unwrap();
        assert_eq!(picked.id, 9);

        source.heaviest = None;
        assert!(pick_weighted_quote(&source, &mut rng).unwrap().is_none());
    }

    #[test]
    fn test_maximum_weights_still_pick() {
        let store = SqliteStore::open_in_memory().unwrap();
        for source in ["S1", "S2", "S3"] {
            store.create_quote(&NewQuote::new("heavy", source, MAX_WEIGHT)).unwrap();
        }
        let err = store.create_quote(&NewQuote::new("heavier", "S4", i64::MAX / 2 + 1)).unwrap_err();
        assert!(err.is_validation());

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..10 {
            assert!(pick_weighted_quote(&store, &mut rng).unwrap().is_some());
        }
    }

    #[test]
    fn test_running_sum_saturates() {
        // Reported total is smaller than the walk, as when rows land mid-scan
        struct GrowingSource(ScriptedSource);

        impl WeightSource for GrowingSource {
            fn sum_weights(&self) -> Result<i64> {
                Ok(1)
            }
            fn weights_by_id(&self) -> Box<dyn Iterator<Item = Result<WeightRow>> + '_> {
                self.0.weights_by_id()
            }
            fn fetch(&self, id: i64) -> Result<Option<Quote>> {
                self.0.fetch(id)
            }
            fn heaviest(&self) -> Result<Option<Quote>> {
                self.0.heaviest()
            }
        }

        let source = GrowingSource(ScriptedSource::new(&[(1, i64::MAX), (2, i64::MAX), (3, 1)], &[1, 2]));
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(pick_weighted_quote(&source, &mut rng).unwrap().unwrap().id, 3);
    }

    #[test]
    fn test_non_positive_total_returns_none() {
        let mut source = ScriptedSource::new(&[(1, 0), (2, 0)], &[]);
        source.heaviest = Some(quote(1, 0));
        let mut rng = StdRng::seed_from_u64(5);
        assert!(pick_weighted_quote(&source, &mut rng).unwrap().is_none());
    }
}
