//! Move selection: opening book first, negamax search otherwise.

use std::path::PathBuf;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shakmaty::Move;
use thiserror::Error;

use crate::book::{BookError, OpeningBook};
use crate::position::{Board, BoardError};
use crate::search::{CancellationToken, SearchConfig, SearchError, SearchStats, Searcher};

#[derive(Clone, Debug, Default)]
pub struct EngineConfig {
    pub search: SearchConfig,
    /// Polyglot book consulted before searching.
    pub book_path: Option<PathBuf>,
    /// Fixes book choices and move shuffling; entropy-seeded when `None`.
    pub seed: Option<u64>,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Board error: {0}")]
    Board(#[from] BoardError),
    #[error("Book error: {0}")]
    Book(#[from] BookError),
    #[error("Search error: {0}")]
    Search(#[from] SearchError),
}

/// Where the last returned move came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    Book,
    Search,
}

pub struct Engine {
    book: Option<OpeningBook>,
    searcher: Searcher<Move>,
    rng: StdRng,
    last_source: Option<MoveSource>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_book(EngineConfig::default(), None)
    }
}

impl Engine {
    /// Builds an engine, loading the configured opening book if there is one.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let book = match &config.book_path {
            Some(path) => Some(OpeningBook::open(path)?),
            None => None,
        };
        Ok(Self::with_book(config, book))
    }

    pub fn with_book(config: EngineConfig, book: Option<OpeningBook>) -> Self {
        let (searcher, rng) = match config.seed {
            Some(seed) => (
                Searcher::with_seed(config.search, seed),
                StdRng::seed_from_u64(seed),
            ),
            None => (Searcher::new(config.search), StdRng::from_entropy()),
        };

        Self {
            book,
            searcher,
            rng,
            last_source: None,
        }
    }

    pub fn searcher(&self) -> &Searcher<Move> {
        &self.searcher
    }

    pub fn search_stats(&self) -> SearchStats {
        self.searcher.stats()
    }

    pub fn last_source(&self) -> Option<MoveSource> {
        self.last_source
    }

    /// A handle that interrupts the search in progress from another thread.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.searcher.cancellation_token()
    }

    /// Chooses a move for the side to move. `board` is left as it was.
    pub fn request_move(&mut self, board: &mut Board) -> Result<Move, EngineError> {
        if let Some(book) = &self.book {
            match book.lookup(board, &mut self.rng) {
                Ok(chess_move) => {
                    info!("book move {}", Board::to_uci(&chess_move));
                    self.last_source = Some(MoveSource::Book);
                    return Ok(chess_move);
                }
                Err(BookError::Miss) => debug!("no book move, searching"),
                Err(error) => return Err(error.into()),
            }
        }

        let chess_move = self.searcher.get_move(board)?;
        info!(
            "search move {} (score {:?}, {} nodes)",
            Board::to_uci(&chess_move),
            self.searcher.stats().last_score,
            self.searcher.stats().nodes
        );
        self.last_source = Some(MoveSource::Search);
        Ok(chess_move)
    }

    /// Reads a FEN and answers with a UCI move.
    pub fn request_move_fen(&mut self, fen: &str) -> Result<String, EngineError> {
        let mut board = Board::from_fen(fen)?;
        let chess_move = self.request_move(&mut board)?;
        Ok(Board::to_uci(&chess_move))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::BookEntry;
    use crate::position::GameState;

    const E2E4: u16 = (1 << 9) | (4 << 6) | (3 << 3) | 4;

    fn config(depth: u8) -> EngineConfig {
        EngineConfig {
            search: SearchConfig::with_depth(depth),
            book_path: None,
            seed: Some(17),
        }
    }

    fn starting_book() -> OpeningBook {
        let entry = BookEntry {
            key: Board::starting_position().identity(),
            raw_move: E2E4,
            weight: 1,
            learn: 0,
        };
        OpeningBook::from_bytes(&entry.to_bytes()).unwrap()
    }

    #[test]
    fn test_book_move_is_preferred() {
        let mut engine = Engine::with_book(config(2), Some(starting_book()));
        let uci = engine
            .request_move_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .unwrap();
        assert_eq!(uci, "e2e4");
        assert_eq!(engine.last_source(), Some(MoveSource::Book));
        assert_eq!(engine.search_stats().nodes, 0);
    }

    #[test]
    fn test_book_miss_falls_back_to_search() {
        let mut engine = Engine::with_book(config(2), Some(starting_book()));
        let uci = engine
            .request_move_fen("6k1/5ppp/8/8/8/8/5PPP/1R4K1 w - - 0 1")
            .unwrap();
        assert_eq!(uci, "b1b8");
        assert_eq!(engine.last_source(), Some(MoveSource::Search));
    }

    #[test]
    fn test_engine_without_book_searches() {
        let mut engine = Engine::with_book(config(1), None);
        let mut board = Board::starting_position();
        let chess_move = engine.request_move(&mut board).unwrap();

        assert!(board.legal_moves().contains(&chess_move));
        assert_eq!(board.ply(), 0);
        assert_eq!(engine.last_source(), Some(MoveSource::Search));
    }

    #[test]
    fn test_errors_are_surfaced() {
        let mut engine = Engine::with_book(config(2), None);
        assert!(matches!(
            engine.request_move_fen("not a fen"),
            Err(EngineError::Board(BoardError::InvalidFen { .. }))
        ));
        assert!(matches!(
            engine.request_move_fen("R6k/6pp/8/8/8/8/8/K7 b - - 0 1"),
            Err(EngineError::Search(SearchError::NoLegalMoves))
        ));
    }

    #[test]
    fn test_missing_book_file_fails_construction() {
        let config = EngineConfig {
            book_path: Some(PathBuf::from("/nonexistent/book.bin")),
            ..config(2)
        };
        assert!(matches!(
            Engine::new(config),
            Err(EngineError::Book(BookError::Io(_)))
        ));
    }
}
