//! CLI command implementations.

pub trait Command {
    fn execute(self) -> Result<(), String>;
}

pub mod best_move;
pub mod serve;

// Shared options for commands
pub(crate) mod util;
