//! Search result cache keyed by (position, remaining depth, side to move).

use std::hash::BuildHasherDefault;
use std::num::NonZeroUsize;

use lru::LruCache;
use rustc_hash::FxHasher;

type FxBuildHasher = BuildHasherDefault<FxHasher>;

/// Entries only answer queries for the exact depth and color they were
/// computed under.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SearchKey {
    pub identity: u64,
    pub depth: i8,
    pub color: i8,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BoundType {
    Exact,
    Lower,
    Upper,
}

impl BoundType {
    /// Classifies a fail-soft score against the window it was searched with.
    pub fn classify(score: i16, alpha: i16, beta: i16) -> Self {
        if score <= alpha {
            BoundType::Upper
        } else if score >= beta {
            BoundType::Lower
        } else {
            BoundType::Exact
        }
    }
}

#[derive(Clone, Debug)]
pub struct SearchEntry<M: Clone> {
    pub score: i16,
    pub best_move: Option<M>,
    pub bound_type: BoundType,
}

pub struct SearchCache<M: Clone> {
    entries: LruCache<SearchKey, SearchEntry<M>, FxBuildHasher>,
    hits: usize,
    bound_rejected: usize,
    stores: usize,
}

impl<M: Clone> SearchCache<M> {
    /// Creates a cache holding at most `capacity` entries, or unbounded for `None`.
    pub fn new(capacity: Option<NonZeroUsize>) -> Self {
        let entries = match capacity {
            Some(capacity) => LruCache::with_hasher(capacity, FxBuildHasher::default()),
            None => LruCache::unbounded_with_hasher(FxBuildHasher::default()),
        };

        Self {
            entries,
            hits: 0,
            bound_rejected: 0,
            stores: 0,
        }
    }

    pub fn store(
        &mut self,
        key: SearchKey,
        score: i16,
        bound_type: BoundType,
        best_move: Option<M>,
    ) {
        self.stores += 1;
        self.entries.put(
            key,
            SearchEntry {
                score,
                best_move,
                bound_type,
            },
        );
    }

    /// Returns the stored result if it decides the node for the window
    /// `[alpha, beta]`. Exact entries always do; bounds only when they already
    /// fall outside the window.
    pub fn probe(&mut self, key: &SearchKey, alpha: i16, beta: i16) -> Option<(i16, Option<M>)> {
        let entry = self.entries.get(key)?;

        let usable = match entry.bound_type {
            BoundType::Exact => true,
            BoundType::Lower => entry.score >= beta,
            BoundType::Upper => entry.score <= alpha,
        };

        if usable {
            self.hits += 1;
            Some((entry.score, entry.best_move.clone()))
        } else {
            self.bound_rejected += 1;
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn bound_rejected(&self) -> usize {
        self.bound_rejected
    }

    pub fn stores(&self) -> usize {
        self.stores
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.bound_rejected = 0;
        self.stores = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(identity: u64, depth: i8, color: i8) -> SearchKey {
        SearchKey {
            identity,
            depth,
            color,
        }
    }

    #[test]
    fn test_exact_entry_is_returned_for_any_window() {
        let mut cache: SearchCache<&str> = SearchCache::new(None);
        cache.store(key(7, 2, 1), 3, BoundType::Exact, Some("e2e4"));

        assert_eq!(cache.probe(&key(7, 2, 1), -100, 100), Some((3, Some("e2e4"))));
        assert_eq!(cache.probe(&key(7, 2, 1), 10, 20), Some((3, Some("e2e4"))));
        assert_eq!(cache.hits(), 2);
    }

    #[test]
    fn test_entries_do_not_leak_across_depth_or_color() {
        let mut cache: SearchCache<&str> = SearchCache::new(None);
        cache.store(key(7, 3, 1), 5, BoundType::Exact, None);

        assert!(cache.probe(&key(7, 2, 1), -100, 100).is_none());
        assert!(cache.probe(&key(7, 3, -1), -100, 100).is_none());
        assert!(cache.probe(&key(8, 3, 1), -100, 100).is_none());
    }

    #[test]
    fn test_bounds_only_hit_when_they_decide_the_window() {
        let mut cache: SearchCache<&str> = SearchCache::new(None);
        cache.store(key(1, 1, 1), 8, BoundType::Lower, Some("cutoff"));
        cache.store(key(2, 1, 1), -8, BoundType::Upper, None);

        assert_eq!(cache.probe(&key(1, 1, 1), 0, 5), Some((8, Some("cutoff"))));
        assert!(cache.probe(&key(1, 1, 1), 0, 10).is_none());

        assert_eq!(cache.probe(&key(2, 1, 1), -5, 5), Some((-8, None)));
        assert!(cache.probe(&key(2, 1, 1), -10, 5).is_none());
        assert_eq!(cache.bound_rejected(), 2);
    }

    #[test]
    fn test_bound_classification() {
        assert_eq!(BoundType::classify(-3, -3, 3), BoundType::Upper);
        assert_eq!(BoundType::classify(3, -3, 3), BoundType::Lower);
        assert_eq!(BoundType::classify(0, -3, 3), BoundType::Exact);
    }

    #[test]
    fn test_capacity_is_respected() {
        let mut cache: SearchCache<u8> = SearchCache::new(NonZeroUsize::new(4));
        for identity in 0..16 {
            cache.store(key(identity, 1, 1), 0, BoundType::Exact, None);
        }
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.stores(), 16);
        assert!(cache.probe(&key(0, 1, 1), -1, 1).is_none());
        assert!(cache.probe(&key(15, 1, 1), -1, 1).is_some());
    }
}
