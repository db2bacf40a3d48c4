//! Core traits for the position interface.
//!
//! The search, the evaluator and both caches only ever observe a position
//! through [`GameState`]. Moves are opaque: they are compared by equality and
//! only ever taken from [`GameState::legal_moves`].

use std::fmt::Debug;

use shakmaty::{Color, Role};

/// Outcome of a position, always reported from White's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWin,
    BlackWin,
    Draw,
    Ongoing,
}

/// Represents a chess position that can be searched with push/pop discipline.
pub trait GameState {
    type Move: Clone + PartialEq + Debug;

    /// Returns every legal move for the side to move.
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Returns the result of the position. With `claim_draw`, draws that a
    /// player could claim (fifty-move rule, threefold repetition) count too.
    fn result(&self, claim_draw: bool) -> GameResult;

    fn is_game_over(&self, claim_draw: bool) -> bool {
        self.result(claim_draw) != GameResult::Ongoing
    }

    /// Returns true if `chess_move` captures a piece in the current position.
    fn is_capture(&self, chess_move: &Self::Move) -> bool;

    /// Returns true if the side to move is in check.
    fn is_check(&self) -> bool;

    fn side_to_move(&self) -> Color;

    /// Applies a legal move. Every push must be balanced by a [`GameState::pop`].
    fn push(&mut self, chess_move: &Self::Move);

    /// Undoes the most recent push, returning the move that was undone.
    fn pop(&mut self) -> Option<Self::Move>;

    /// A stable key for the position, equal for equal positions.
    fn identity(&self) -> u64;

    /// Key under which scores of this position are memoized. Two positions
    /// sharing a cache key must also agree on [`GameState::result`], so
    /// implementations whose result depends on history fold that in here.
    fn cache_key(&self) -> u64 {
        self.identity()
    }

    /// Number of pieces of the given role and color on the board.
    fn piece_count(&self, color: Color, role: Role) -> u32;
}

/// The negamax color sign: +1 for White, -1 for Black.
#[inline]
pub fn color_sign(color: Color) -> i16 {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}
