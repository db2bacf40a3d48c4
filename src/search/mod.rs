//! Negamax search with alpha-beta pruning.
//!
//! # Core Algorithm
//!
//! A single recursive routine serves both sides: every ply negates the child's
//! score and swaps the `[alpha, beta]` window. Leaves are scored by the static
//! material evaluator, multiplied by the color sign of the side to move.
//!
//! # Quiescence
//!
//! A move is quiet when it is not a capture and does not give check. Nodes
//! reached through non-quiet moves keep searching past depth zero, down to a
//! hard floor of `-quiescence_depth`, so capture and check sequences are not
//! cut off halfway.
//!
//! # Move Ordering
//!
//! Legal moves are shuffled, then stably sorted by the static score of the
//! position they lead to. Ties therefore vary between games while the best
//! score found is the same as with any other order.
//!
//! # Search Cache
//!
//! Results are memoized per (position, remaining depth, color) together with
//! the kind of bound they represent, so transpositions inside a search and
//! repeated top-level calls are answered without re-searching.

mod cache;
mod cancellation;
mod config;
mod negamax;


use thiserror::Error;

pub use cache::{BoundType, SearchCache, SearchEntry, SearchKey};
pub use cancellation::CancellationToken;
pub use config::SearchConfig;
pub use negamax::{SearchStats, Searcher};

/// Bound used for the root window. Dominates every evaluation, decisive
/// results included, and can be negated without overflow.
pub const INFINITY: i16 = i16::MAX;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("no legal moves in the searched position")]
    NoLegalMoves,
    #[error("depth must be at least 1")]
    DepthTooLow,
    #[error("position reported no legal moves but the game is not over")]
    InconsistentPosition,
    #[error("search was cancelled")]
    Cancelled,
    #[error("search exceeded its time limit")]
    TimedOut,
}
