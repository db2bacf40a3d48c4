//! CLI argument parsing using StructOpt.

use structopt::StructOpt;

use crate::cli::commands::{best_move::BestMoveArgs, serve::ServeArgs};

#[derive(StructOpt)]
#[structopt(
    name = "chess-negamax",
    about = "Opening book lookup and negamax search for chess positions"
)]
pub enum ChessNegamax {
    #[structopt(
        name = "best-move",
        about = "Print the engine's move for the position given in FEN notation with `--fen` (required). The opening book given with `--book` is consulted first; otherwise the position is searched to `--depth` plies (default: 2)."
    )]
    BestMove(BestMoveArgs),
    #[structopt(
        name = "serve",
        about = "Read one FEN per line from stdin and answer each with a move in UCI notation on stdout. Searches run on a background worker. The line `quit` stops the server."
    )]
    Serve(ServeArgs),
}

impl crate::cli::commands::Command for ChessNegamax {
    fn execute(self) -> Result<(), String> {
        match self {
            Self::BestMove(cmd) => cmd.execute(),
            Self::Serve(cmd) => cmd.execute(),
        }
    }
}
