use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Invalid FEN `{fen}`: {reason}")]
    InvalidFen { fen: String, reason: String },
    #[error("Invalid move `{uci}` in this position")]
    InvalidMove { uci: String },
}
