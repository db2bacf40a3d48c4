use std::num::NonZeroUsize;

use shakmaty::Color;
#[cfg(feature = "instrumentation")]
use tracing::instrument;

use crate::position::{GameResult, GameState};

use self::piece_values::{material_value, SCORED_ROLES};

pub mod cache;
mod piece_values;

pub use cache::EvaluationCache;

// These scores are significantly larger than any possible material value,
// so a forced win always dominates a material advantage.
pub const WHITE_WINS: i16 = i16::MAX / 2;
pub const BLACK_WINS: i16 = -WHITE_WINS;

/// Returns the score of a finished game, or `None` while the game goes on.
#[inline]
pub fn terminal_score(result: GameResult) -> Option<i16> {
    match result {
        GameResult::WhiteWin => Some(WHITE_WINS),
        GameResult::BlackWin => Some(BLACK_WINS),
        GameResult::Draw => Some(0),
        GameResult::Ongoing => None,
    }
}

/// White material minus Black material, in pawn units.
#[inline]
pub fn material_score<S: GameState>(state: &S) -> i16 {
    player_material_score(state, Color::White) - player_material_score(state, Color::Black)
}

#[inline]
fn player_material_score<S: GameState>(state: &S, color: Color) -> i16 {
    SCORED_ROLES
        .iter()
        .map(|&role| state.piece_count(color, role) as i16 * material_value(role))
        .sum()
}

/// Scores a position without the cache. Always White-positive.
pub fn score<S: GameState>(state: &S) -> i16 {
    terminal_score(state.result(true)).unwrap_or_else(|| material_score(state))
}

/// Static evaluator that memoizes scores per position cache key.
pub struct Evaluator {
    cache: EvaluationCache,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Evaluator {
    pub fn new(capacity: Option<NonZeroUsize>) -> Self {
        Self {
            cache: EvaluationCache::new(capacity),
        }
    }

    /// Returns the White-positive score of the position.
    #[cfg_attr(feature = "instrumentation", instrument(skip_all))]
    pub fn evaluate<S: GameState>(&mut self, state: &S) -> i16 {
        let key = state.cache_key();
        if let Some(cached) = self.cache.get(key) {
            return cached;
        }

        let value = score(state);
        self.cache.insert(key, value);
        value
    }

    /// Scores the position reached by `chess_move`, leaving `state` as it was.
    pub fn evaluate_move<S: GameState>(&mut self, state: &mut S, chess_move: &S::Move) -> i16 {
        state.push(chess_move);
        let value = self.evaluate(state);
        let undone = state.pop();
        debug_assert!(undone.is_some(), "evaluate_move must undo its own push");
        value
    }

    pub fn cache(&self) -> &EvaluationCache {
        &self.cache
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess_position;
    use crate::position::Board;

    /// Flips the board vertically, swaps piece colors and the side to move.
    fn mirror_fen(fen: &str) -> String {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        let placement = fields[0]
            .split('/')
            .rev()
            .map(|rank| {
                rank.chars()
                    .map(|c| {
                        if c.is_ascii_uppercase() {
                            c.to_ascii_lowercase()
                        } else {
                            c.to_ascii_uppercase()
                        }
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("/");
        let turn = if fields[1] == "w" { "b" } else { "w" };
        format!("{} {} - - {} {}", placement, turn, fields[4], fields[5])
    }

    #[test]
    fn test_starting_position_is_balanced() {
        let mut evaluator = Evaluator::default();
        let board = Board::starting_position();
        assert_eq!(evaluator.evaluate(&board), 0);
    }

    #[test]
    fn test_material_weights() {
        let mut evaluator = Evaluator::default();

        let board = chess_position! {
            ....k...
            ........
            ........
            ...q....
            ........
            ..NB....
            PPP.....
            R...K...
        };
        println!("Testing board:\n{}", board);

        // 3 pawns + knight + bishop + rook - queen
        assert_eq!(evaluator.evaluate(&board), 3 + 3 + 3 + 5 - 9);
    }

    #[test]
    fn test_score_is_color_symmetric() {
        let fens = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1",
            "4k3/8/8/3q4/8/2NB4/PPP5/R3K3 w - - 0 1",
            "r3k3/1p6/8/8/4N3/8/3Q4/4K3 b - - 0 1",
            "6k1/5ppp/8/8/8/8/5PPP/1R4K1 w - - 0 1",
            "7k/8/8/8/8/8/8/K6r w - - 3 40",
        ];

        let mut evaluator = Evaluator::default();
        for fen in fens.iter() {
            let board = Board::from_fen(fen).unwrap();
            let mirrored = Board::from_fen(&mirror_fen(fen)).unwrap();
            println!("Testing board:\n{}\nmirrored:\n{}", board, mirrored);

            assert_eq!(
                evaluator.evaluate(&board),
                -evaluator.evaluate(&mirrored),
                "mirror of {} should negate the score",
                fen
            );
        }
    }

    #[test]
    fn test_white_checkmate_is_white_wins() {
        let mut evaluator = Evaluator::default();
        let board = chess_position! { b;
            R......k
            ......pp
            ........
            ........
            ........
            ........
            ........
            K.......
        };
        assert_eq!(evaluator.evaluate(&board), WHITE_WINS);
    }

    #[test]
    fn test_black_checkmate_is_black_wins() {
        let mut evaluator = Evaluator::default();
        let board = chess_position! { w;
            k.......
            ........
            ........
            ........
            ........
            ........
            .....PPP
            r.....K.
        };
        println!("Testing board:\n{}", board);
        assert_eq!(evaluator.evaluate(&board), BLACK_WINS);
    }

    #[test]
    fn test_drawn_positions_score_zero() {
        let mut evaluator = Evaluator::default();

        let stalemate = chess_position! { b;
            .......k
            .....Q..
            ........
            ........
            ........
            ........
            ........
            K.......
        };
        assert_eq!(evaluator.evaluate(&stalemate), 0);

        // Knight against bare king is insufficient material despite the extra piece.
        let insufficient = chess_position! {
            .......k
            ........
            ........
            ........
            ........
            ........
            ........
            K.N.....
        };
        assert_eq!(evaluator.evaluate(&insufficient), 0);

        let fifty_moves = Board::from_fen("7k/8/8/8/8/8/8/KQ6 w - - 100 90").unwrap();
        assert_eq!(evaluator.evaluate(&fifty_moves), 0);
    }

    #[test]
    fn test_evaluate_move_restores_position_and_caches_result() {
        let mut evaluator = Evaluator::default();
        let mut board = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let before = board.identity();
        let capture = board.parse_uci("e4d5").unwrap();

        assert_eq!(evaluator.evaluate_move(&mut board, &capture), 1);
        assert_eq!(board.identity(), before);
        assert_eq!(board.ply(), 0);

        // The score is stored under the resulting position, not the current one.
        board.push(&capture);
        let after = board.cache_key();
        board.pop();
        assert_eq!(evaluator.cache.get(after), Some(1));
        assert_eq!(evaluator.cache.get(before), None);
    }

    #[test]
    fn test_warm_cache_still_scores_fifty_move_draw() {
        let mut evaluator = Evaluator::default();

        let fresh = Board::from_fen("7k/8/8/8/8/8/8/KQ6 w - - 0 1").unwrap();
        assert_eq!(evaluator.evaluate(&fresh), 9);

        // Same placement, reached after a hundred reversible plies.
        let drawn = Board::from_fen("7k/8/8/8/8/8/8/KQ6 w - - 100 90").unwrap();
        assert_eq!(evaluator.evaluate(&drawn), 0);
        assert_eq!(evaluator.evaluate(&fresh), 9);
    }

    #[test]
    fn test_warm_cache_still_scores_threefold_repetition() {
        let mut evaluator = Evaluator::default();
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/QN2K3 w - - 0 1").unwrap();
        assert_eq!(evaluator.evaluate(&board), 12);

        for _ in 0..2 {
            for uci in ["b1c3", "e8d8", "c3b1", "d8e8"] {
                board.play(uci).unwrap();
            }
        }
        assert_eq!(evaluator.evaluate(&board), 0);
    }
}
