//! Position interface consumed by the search core, and its binding to `shakmaty`.

pub mod board;
mod display;
pub mod error;
pub mod traits;

pub use board::Board;
pub use error::BoardError;
pub use traits::{color_sign, GameResult, GameState};
