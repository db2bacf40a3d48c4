use std::num::NonZeroUsize;
use std::time::Duration;

const DEFAULT_CACHE_ENTRIES: usize = 1 << 20;

/// Search configuration parameters.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Nominal depth of a top-level search, in plies.
    pub depth: u8,
    /// How far below depth zero capture and check sequences may extend.
    pub quiescence_depth: u8,
    /// Entry budget of the evaluation cache; `None` never evicts.
    pub evaluation_cache_capacity: Option<NonZeroUsize>,
    /// Entry budget of the search cache; `None` never evicts.
    pub search_cache_capacity: Option<NonZeroUsize>,
    /// Search root moves on the rayon pool, each with its own caches.
    pub parallel: bool,
    /// Wall-clock budget per top-level search; `None` runs to completion.
    pub time_limit: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 2,
            quiescence_depth: 3,
            evaluation_cache_capacity: NonZeroUsize::new(DEFAULT_CACHE_ENTRIES),
            search_cache_capacity: NonZeroUsize::new(DEFAULT_CACHE_ENTRIES),
            parallel: false,
            time_limit: None,
        }
    }
}

impl SearchConfig {
    pub fn with_depth(depth: u8) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    /// The remaining depth at which every node becomes a leaf.
    pub(crate) fn depth_floor(&self) -> i8 {
        -(self.quiescence_depth.min(i8::MAX as u8) as i8)
    }
}

/// Converts a nominal depth to the signed remaining depth used during search.
pub(crate) fn remaining_depth(depth: u8) -> i8 {
    depth.min(i8::MAX as u8) as i8
}
