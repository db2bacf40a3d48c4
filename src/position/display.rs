use std::fmt;

use shakmaty::{Color, Position, Square};

use super::Board;

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let board = self.position().board();
        for rank in (0..8u32).rev() {
            let row: String = (0..8u32)
                .map(|file| {
                    board
                        .piece_at(Square::new(rank * 8 + file))
                        .map_or('.', |piece| piece.char())
                })
                .collect();
            writeln!(f, "{} {}", rank + 1, row)?;
        }
        writeln!(f, "  abcdefgh")?;
        let turn = match self.position().turn() {
            Color::White => "white",
            Color::Black => "black",
        };
        write!(f, "{} to move", turn)
    }
}

/// Builds a [`Board`] from a diagram drawn from White's side, A8 first.
///
/// The optional leading `w;` or `b;` sets the side to move (White by default).
/// Positions have no castling rights and no en passant square.
#[macro_export]
macro_rules! chess_position {
    (w; $($piece:tt)*) => {
        $crate::chess_position!(@build "w", $($piece)*)
    };
    (b; $($piece:tt)*) => {
        $crate::chess_position!(@build "b", $($piece)*)
    };
    (@build $turn:literal, $($piece:tt)*) => {{
        // Convert all input tokens to a string and filter out whitespace characters.
        let squares: Vec<char> = stringify!($($piece)*)
            .chars()
            .filter(|&c| !c.is_whitespace())
            .collect();
        assert_eq!(squares.len(), 64, "Invalid number of squares. Expected 64, got {}", squares.len());

        let mut placement = String::new();
        for (row, rank) in squares.chunks(8).enumerate() {
            if row > 0 {
                placement.push('/');
            }
            let mut empty = 0;
            for &c in rank {
                if c == '.' {
                    empty += 1;
                    continue;
                }
                if empty > 0 {
                    placement.push_str(&empty.to_string());
                    empty = 0;
                }
                placement.push(c);
            }
            if empty > 0 {
                placement.push_str(&empty.to_string());
            }
        }

        let fen = format!("{} {} - - 0 1", placement, $turn);
        $crate::position::Board::from_fen(&fen)
            .unwrap_or_else(|e| panic!("invalid test position: {}", e))
    }};
    ($($piece:tt)*) => {
        $crate::chess_position!(@build "w", $($piece)*)
    };
}
