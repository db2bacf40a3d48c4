//! `GameState` implementation backed by `shakmaty`.
//!
//! The board keeps a stack of the positions it has passed through so that
//! `pop` can restore them exactly and so repetitions can be counted for draw
//! detection.

use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Outcome, Position, Role};

use super::error::BoardError;
use super::traits::{GameResult, GameState};

/// Plies without a capture or pawn move after which a draw may be claimed.
const FIFTY_MOVE_PLIES: u32 = 100;
/// Plies without a capture or pawn move after which the game is drawn.
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

// Multipliers mixing the halfmove clock and the repetition count into the
// cache key, so positions that differ only in draw state never share scores.
const HALFMOVE_SALT: u64 = 0x9e37_79b9_7f4a_7c15;
const REPETITION_SALT: u64 = 0xc2b2_ae3d_27d4_eb4f;

#[derive(Debug, Clone)]
struct Frame {
    position: Chess,
    identity: u64,
    cache_key: u64,
    played: Move,
}

#[derive(Debug, Clone)]
pub struct Board {
    position: Chess,
    identity: u64,
    cache_key: u64,
    history: Vec<Frame>,
}

impl Default for Board {
    fn default() -> Self {
        Self::starting_position()
    }
}

impl Board {
    pub fn starting_position() -> Self {
        Self::from_position(Chess::default())
    }

    pub fn from_position(position: Chess) -> Self {
        let identity = position_identity(&position);
        let mut board = Self {
            position,
            identity,
            cache_key: identity,
            history: Vec::new(),
        };
        board.cache_key = board.draw_aware_key();
        board
    }

    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let invalid = |reason: String| BoardError::InvalidFen {
            fen: fen.to_string(),
            reason,
        };

        let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{}", e)))?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(format!("{}", e)))?;

        Ok(Self::from_position(position))
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    /// Number of moves currently pushed on top of the root position.
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.history.last().map(|frame| &frame.played)
    }

    /// Resolves a UCI move string (e.g. `e2e4`, `e7e8q`) against this position.
    pub fn parse_uci(&self, uci: &str) -> Result<Move, BoardError> {
        let invalid = || BoardError::InvalidMove {
            uci: uci.to_string(),
        };

        let parsed: UciMove = uci.trim().parse().map_err(|_| invalid())?;
        parsed.to_move(&self.position).map_err(|_| invalid())
    }

    pub fn to_uci(chess_move: &Move) -> String {
        chess_move.to_uci(CastlingMode::Standard).to_string()
    }

    /// Plays a move given in UCI notation, keeping it in the history.
    pub fn play(&mut self, uci: &str) -> Result<Move, BoardError> {
        let chess_move = self.parse_uci(uci)?;
        self.push(&chess_move);
        Ok(chess_move)
    }

    /// How many times the current position has occurred, including now.
    pub fn repetition_count(&self) -> usize {
        // Positions before the last irreversible move cannot repeat.
        let reversible_plies = self.position.halfmoves() as usize;
        1 + self
            .history
            .iter()
            .rev()
            .take(reversible_plies)
            .filter(|frame| frame.identity == self.identity)
            .count()
    }

    /// The identity mixed with the halfmove clock and the repetition count.
    /// Equals the identity for a first occurrence right after an irreversible
    /// move.
    fn draw_aware_key(&self) -> u64 {
        let halfmoves = u64::from(self.position.halfmoves());
        let repeats = self.repetition_count().saturating_sub(1) as u64;
        self.identity
            ^ HALFMOVE_SALT.wrapping_mul(halfmoves)
            ^ REPETITION_SALT.wrapping_mul(repeats)
    }
}

impl GameState for Board {
    type Move = Move;

    fn legal_moves(&self) -> Vec<Move> {
        self.position.legal_moves().into_iter().collect()
    }

    fn result(&self, claim_draw: bool) -> GameResult {
        match self.position.outcome() {
            Some(Outcome::Decisive { winner }) => {
                return match winner {
                    Color::White => GameResult::WhiteWin,
                    Color::Black => GameResult::BlackWin,
                };
            }
            Some(Outcome::Draw) => return GameResult::Draw,
            None => {}
        }

        let halfmoves = self.position.halfmoves();
        if halfmoves >= SEVENTY_FIVE_MOVE_PLIES {
            return GameResult::Draw;
        }

        let repetitions = self.repetition_count();
        if repetitions >= 5 {
            return GameResult::Draw;
        }

        if claim_draw && (halfmoves >= FIFTY_MOVE_PLIES || repetitions >= 3) {
            return GameResult::Draw;
        }

        GameResult::Ongoing
    }

    #[inline]
    fn is_capture(&self, chess_move: &Move) -> bool {
        chess_move.is_capture()
    }

    #[inline]
    fn is_check(&self) -> bool {
        self.position.is_check()
    }

    #[inline]
    fn side_to_move(&self) -> Color {
        self.position.turn()
    }

    fn push(&mut self, chess_move: &Move) {
        let previous = self.position.clone();
        self.position.play_unchecked(chess_move);
        self.history.push(Frame {
            position: previous,
            identity: self.identity,
            cache_key: self.cache_key,
            played: chess_move.clone(),
        });
        self.identity = position_identity(&self.position);
        self.cache_key = self.draw_aware_key();
    }

    fn pop(&mut self) -> Option<Move> {
        let frame = self.history.pop()?;
        self.position = frame.position;
        self.identity = frame.identity;
        self.cache_key = frame.cache_key;
        Some(frame.played)
    }

    #[inline]
    fn identity(&self) -> u64 {
        self.identity
    }

    #[inline]
    fn cache_key(&self) -> u64 {
        self.cache_key
    }

    #[inline]
    fn piece_count(&self, color: Color, role: Role) -> u32 {
        let board = self.position.board();
        (board.by_color(color) & board.by_role(role)).count() as u32
    }
}

/// Polyglot-compatible Zobrist key, so the same identity indexes opening books.
fn position_identity(position: &Chess) -> u64 {
    position.zobrist_hash::<Zobrist64>(EnPassantMode::Legal).0
}
