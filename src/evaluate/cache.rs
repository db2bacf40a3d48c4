//! Memoized static scores keyed by position identity.

use std::hash::BuildHasherDefault;
use std::num::NonZeroUsize;

use lru::LruCache;
use rustc_hash::FxHasher;

type FxBuildHasher = BuildHasherDefault<FxHasher>;

/// Maps a position identity to its static score. A score never changes once
/// stored, so eviction only costs a recomputation.
pub struct EvaluationCache {
    entries: LruCache<u64, i16, FxBuildHasher>,
    hits: usize,
    misses: usize,
}

impl EvaluationCache {
    /// Creates a cache holding at most `capacity` scores, or unbounded for `None`.
    pub fn new(capacity: Option<NonZeroUsize>) -> Self {
        let entries = match capacity {
            Some(capacity) => LruCache::with_hasher(capacity, FxBuildHasher::default()),
            None => LruCache::unbounded_with_hasher(FxBuildHasher::default()),
        };

        Self {
            entries,
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, identity: u64) -> Option<i16> {
        match self.entries.get(&identity) {
            Some(&score) => {
                self.hits += 1;
                Some(score)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, identity: u64, score: i16) {
        self.entries.put(identity, score);
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

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
