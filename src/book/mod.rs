//! Opening book backed by a Polyglot `.bin` file.
//!
//! The book is read once and kept in memory, sorted by position key. Lookups
//! pick among the book moves that are legal in the position, weighted by the
//! counts recorded in the file.

use std::fs;
use std::path::Path;

use log::info;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use shakmaty::Move;
use thiserror::Error;

use crate::position::{Board, GameState};

mod polyglot;

pub use polyglot::{BookEntry, BookMove, ENTRY_SIZE};

#[derive(Error, Debug)]
pub enum BookError {
    #[error("no book move for this position")]
    Miss,
    #[error("failed to read opening book: {0}")]
    Io(#[from] std::io::Error),
    #[error("opening book length {len} is not a multiple of {}", ENTRY_SIZE)]
    Malformed { len: usize },
}

#[derive(Debug, Clone, Default)]
pub struct OpeningBook {
    entries: Vec<BookEntry>,
}

impl OpeningBook {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BookError> {
        let bytes = fs::read(path.as_ref())?;
        let book = Self::from_bytes(&bytes)?;
        info!(
            "loaded opening book {} ({} entries)",
            path.as_ref().display(),
            book.len()
        );
        Ok(book)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BookError> {
        if bytes.len() % ENTRY_SIZE != 0 {
            return Err(BookError::Malformed { len: bytes.len() });
        }

        let mut entries: Vec<BookEntry> = bytes
            .chunks_exact(ENTRY_SIZE)
            .map(|chunk| {
                let mut entry = [0u8; ENTRY_SIZE];
                entry.copy_from_slice(chunk);
                BookEntry::parse(&entry)
            })
            .collect();
        entries.sort_by_key(|entry| entry.key);

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries stored for a position key.
    pub fn entries_for(&self, key: u64) -> &[BookEntry] {
        let start = self.entries.partition_point(|entry| entry.key < key);
        let end = self.entries.partition_point(|entry| entry.key <= key);
        &self.entries[start..end]
    }

    /// Book moves that are legal in `board`, with their summed weights.
    pub fn candidates(&self, board: &Board) -> Vec<(Move, u32)> {
        let legal_moves = board.legal_moves();
        let mut candidates: Vec<(Move, u32)> = Vec::new();

        for entry in self.entries_for(board.identity()) {
            let book_move = entry.book_move();
            let chess_move = match legal_moves.iter().find(|m| book_move.matches(m)) {
                Some(chess_move) => chess_move,
                None => continue,
            };

            match candidates.iter_mut().find(|(m, _)| m == chess_move) {
                Some((_, weight)) => *weight += u32::from(entry.weight),
                None => candidates.push((chess_move.clone(), u32::from(entry.weight))),
            }
        }

        candidates
    }

    /// Picks a book move for `board` by weighted random choice.
    pub fn lookup<R: Rng + ?Sized>(&self, board: &Board, rng: &mut R) -> Result<Move, BookError> {
        let mut candidates = self.candidates(board);
        if candidates.is_empty() {
            return Err(BookError::Miss);
        }

        // Fails when every weight is zero.
        let distribution = WeightedIndex::new(candidates.iter().map(|(_, weight)| *weight))
            .map_err(|_| BookError::Miss)?;
        let index = distribution.sample(rng);

        Ok(candidates.swap_remove(index).0)
    }
}
