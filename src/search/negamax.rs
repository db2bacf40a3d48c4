//! Negamax search implementation.

use std::cmp::Reverse;
use std::fmt::Debug;
use std::time::{Duration, Instant};

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use smallvec::SmallVec;
#[cfg(feature = "instrumentation")]
use tracing::instrument;

use super::cache::{BoundType, SearchCache, SearchKey};
use super::cancellation::CancellationToken;
use super::config::{remaining_depth, SearchConfig};
use super::{SearchError, INFINITY};
use crate::evaluate::Evaluator;
use crate::position::{color_sign, GameState};

type MoveList<M> = SmallVec<[M; 64]>;

/// How often (in nodes) the wall clock is consulted.
const CLOCK_CHECK_INTERVAL: usize = 1024;

/// Statistics collected during search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: usize,
    pub leaves: usize,
    pub cache_hits: usize,
    pub cutoffs: usize,
    pub last_score: Option<i16>,
    pub last_duration: Option<Duration>,
}

impl SearchStats {
    fn merge(&mut self, other: &SearchStats) {
        self.nodes += other.nodes;
        self.leaves += other.leaves;
        self.cache_hits += other.cache_hits;
        self.cutoffs += other.cutoffs;
    }
}

/// Owns the evaluation and search caches for one engine. A searcher is used
/// by one thread at a time; parallel root search gives each task its own.
pub struct Searcher<M: Clone> {
    config: SearchConfig,
    evaluator: Evaluator,
    cache: SearchCache<M>,
    rng: StdRng,
    stats: SearchStats,
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl<M> Searcher<M>
where
    M: Clone + PartialEq + Debug + Send + Sync,
{
    pub fn new(config: SearchConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a searcher whose move shuffling is reproducible.
    pub fn with_seed(config: SearchConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SearchConfig, rng: StdRng) -> Self {
        Self {
            evaluator: Evaluator::new(config.evaluation_cache_capacity),
            cache: SearchCache::new(config.search_cache_capacity),
            config,
            rng,
            stats: SearchStats::default(),
            cancellation: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A searcher for one root subtree, with fresh caches but sharing the
    /// parent's cancellation token and deadline.
    fn partition(
        config: SearchConfig,
        seed: u64,
        cancellation: CancellationToken,
        deadline: Option<Instant>,
    ) -> Self {
        let mut searcher = Self::with_seed(config, seed);
        searcher.cancellation = cancellation;
        searcher.deadline = deadline;
        searcher
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn search_depth(&self) -> u8 {
        self.config.depth
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SearchStats::default();
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn evaluator_mut(&mut self) -> &mut Evaluator {
        &mut self.evaluator
    }

    pub fn search_cache(&self) -> &SearchCache<M> {
        &self.cache
    }

    pub fn clear_caches(&mut self) {
        self.cache.clear();
        self.evaluator.clear();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Searches to the configured depth with a full window and returns the
    /// best move for the side to move.
    pub fn get_move<S>(&mut self, state: &mut S) -> Result<M, SearchError>
    where
        S: GameState<Move = M> + Clone + Send + Sync,
    {
        let depth = self.config.depth;
        if depth < 1 {
            return Err(SearchError::DepthTooLow);
        }

        let color = color_sign(state.side_to_move());
        let (score, best_move) = self.search(state, depth, -INFINITY, INFINITY, color)?;
        debug!(
            "depth {} search: score {} after {} nodes ({} cache hits, {} cutoffs)",
            depth, score, self.stats.nodes, self.stats.cache_hits, self.stats.cutoffs
        );

        best_move.ok_or(SearchError::NoLegalMoves)
    }

    /// Searches `state` to `max_depth` plies within `[alpha, beta]`.
    ///
    /// `color` is +1 when White is to move and -1 when Black is. The returned
    /// score is from the mover's point of view. A quiet root at depth zero is
    /// scored directly and carries no move. Otherwise a root without legal
    /// moves is an error, even when the game is over.
    ///
    /// `state` is restored before this returns, whatever the outcome.
    /// [`Searcher::stats`] describes this search only.
    pub fn search<S>(
        &mut self,
        state: &mut S,
        max_depth: u8,
        alpha: i16,
        beta: i16,
        color: i16,
    ) -> Result<(i16, Option<M>), SearchError>
    where
        S: GameState<Move = M> + Clone + Send + Sync,
    {
        self.reset_stats();
        let start = Instant::now();
        self.deadline = self.config.time_limit.map(|limit| start + limit);

        let result = self.search_root(state, remaining_depth(max_depth), alpha, beta, color);

        self.deadline = None;
        self.cancellation.reset();

        if let Ok((score, _)) = &result {
            self.stats.last_score = Some(*score);
            self.stats.last_duration = Some(start.elapsed());
        }

        result
    }

    fn search_root<S>(
        &mut self,
        state: &mut S,
        depth: i8,
        alpha: i16,
        beta: i16,
        color: i16,
    ) -> Result<(i16, Option<M>), SearchError>
    where
        S: GameState<Move = M> + Clone + Send + Sync,
    {
        let quiet = !state.is_check();
        if depth <= 0 && quiet {
            self.stats.leaves += 1;
            return Ok((color * self.evaluator.evaluate(state), None));
        }

        if state.legal_moves().is_empty() {
            return Err(SearchError::NoLegalMoves);
        }

        if self.config.parallel {
            self.expand_parallel(state, depth, alpha, beta, color)
        } else {
            self.expand(state, depth, alpha, beta, color)
        }
    }

    #[cfg_attr(feature = "instrumentation", instrument(skip_all))]
    fn negamax<S>(
        &mut self,
        state: &mut S,
        depth: i8,
        quiet: bool,
        alpha: i16,
        beta: i16,
        color: i16,
    ) -> Result<(i16, Option<M>), SearchError>
    where
        S: GameState<Move = M>,
    {
        self.check_interrupt()?;
        self.stats.nodes += 1;

        if (depth <= 0 && quiet) || depth <= self.config.depth_floor() || state.is_game_over(true)
        {
            self.stats.leaves += 1;
            return Ok((color * self.evaluator.evaluate(state), None));
        }

        self.expand(state, depth, alpha, beta, color)
    }

    /// Searches every move of an interior node, consulting and filling the
    /// search cache.
    fn expand<S>(
        &mut self,
        state: &mut S,
        depth: i8,
        mut alpha: i16,
        beta: i16,
        color: i16,
    ) -> Result<(i16, Option<M>), SearchError>
    where
        S: GameState<Move = M>,
    {
        let key = search_key(state, depth, color);
        if let Some(cached) = self.cache.probe(&key, alpha, beta) {
            self.stats.cache_hits += 1;
            return Ok(cached);
        }

        let original_alpha = alpha;
        let moves = self.order_moves(state, color);
        if moves.is_empty() {
            return Err(SearchError::InconsistentPosition);
        }

        let mut best_score = -INFINITY;
        let mut best_move = None;

        for chess_move in moves {
            let (child_score, _) = with_move_applied(state, &chess_move, |state, quiet| {
                self.negamax(state, depth - 1, quiet, -beta, -alpha, -color)
            })?;
            let score = -child_score;

            // Later moves win ties.
            if best_move.is_none() || score >= best_score {
                best_score = score;
                best_move = Some(chess_move);
            }

            alpha = alpha.max(best_score);
            if alpha >= beta {
                self.stats.cutoffs += 1;
                break;
            }
        }

        let bound_type = BoundType::classify(best_score, original_alpha, beta);
        self.cache.store(key, best_score, bound_type, best_move.clone());

        Ok((best_score, best_move))
    }

    /// Searches each root move on the rayon pool with a full window. Every
    /// task works on its own copy of the position and its own caches.
    fn expand_parallel<S>(
        &mut self,
        state: &mut S,
        depth: i8,
        alpha: i16,
        beta: i16,
        color: i16,
    ) -> Result<(i16, Option<M>), SearchError>
    where
        S: GameState<Move = M> + Clone + Send + Sync,
    {
        let key = search_key(state, depth, color);
        if let Some(cached) = self.cache.probe(&key, alpha, beta) {
            self.stats.cache_hits += 1;
            return Ok(cached);
        }

        let moves = self.order_moves(state, color);
        if moves.is_empty() {
            return Err(SearchError::InconsistentPosition);
        }
        let seeds: Vec<u64> = moves.iter().map(|_| self.rng.gen()).collect();

        let root: &S = state;
        let config = &self.config;
        let cancellation = &self.cancellation;
        let deadline = self.deadline;

        let results = moves
            .as_slice()
            .par_iter()
            .zip(seeds.par_iter())
            .map(|(chess_move, &seed)| -> Result<(i16, SearchStats), SearchError> {
                let mut searcher =
                    Searcher::partition(config.clone(), seed, cancellation.clone(), deadline);
                let mut child = root.clone();
                let (child_score, _) = with_move_applied(&mut child, chess_move, |child, quiet| {
                    searcher.negamax(child, depth - 1, quiet, -INFINITY, INFINITY, -color)
                })?;
                Ok((-child_score, searcher.stats))
            })
            .collect::<Result<Vec<_>, SearchError>>()?;

        let mut best_score = -INFINITY;
        let mut best_move = None;
        for (chess_move, (score, stats)) in moves.into_iter().zip(results) {
            self.stats.merge(&stats);
            if best_move.is_none() || score >= best_score {
                best_score = score;
                best_move = Some(chess_move);
            }
        }

        let bound_type = BoundType::classify(best_score, alpha, beta);
        self.cache.store(key, best_score, bound_type, best_move.clone());

        Ok((best_score, best_move))
    }

    /// Shuffles the legal moves, then orders them best-first for the side to
    /// move by the static score of the resulting position.
    fn order_moves<S>(&mut self, state: &mut S, color: i16) -> MoveList<M>
    where
        S: GameState<Move = M>,
    {
        let mut moves = state.legal_moves();
        moves.shuffle(&mut self.rng);

        let evaluator = &mut self.evaluator;
        let mut scored: SmallVec<[(i16, M); 64]> = moves
            .into_iter()
            .map(|chess_move| {
                let score = color * evaluator.evaluate_move(state, &chess_move);
                (score, chess_move)
            })
            .collect();

        // Stable, so equal scores keep their shuffled order.
        scored.sort_by_key(|(score, _)| Reverse(*score));
        scored.into_iter().map(|(_, chess_move)| chess_move).collect()
    }

    fn check_interrupt(&self) -> Result<(), SearchError> {
        if self.cancellation.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        if let Some(deadline) = self.deadline {
            if self.stats.nodes % CLOCK_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
                return Err(SearchError::TimedOut);
            }
        }

        Ok(())
    }
}

fn search_key<S: GameState>(state: &S, depth: i8, color: i16) -> SearchKey {
    SearchKey {
        identity: state.cache_key(),
        depth,
        color: color as i8,
    }
}

/// Pushes a move, runs `f` on the resulting position and pops the move again,
/// whether or not `f` succeeded. `f` also learns whether the move was quiet.
fn with_move_applied<S, F, R>(state: &mut S, chess_move: &S::Move, f: F) -> Result<R, SearchError>
where
    S: GameState,
    F: FnOnce(&mut S, bool) -> Result<R, SearchError>,
{
    let capture = state.is_capture(chess_move);
    state.push(chess_move);
    let quiet = !capture && !state.is_check();

    let result = f(state, quiet);

    state.pop().ok_or(SearchError::InconsistentPosition)?;
    result
}
