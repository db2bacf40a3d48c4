//! Serve command - answer FEN lines from stdin through a search worker.

use std::io::{self, BufRead, Write};

use chess_negamax::engine::Engine;
use chess_negamax::worker::{SearchWorker, SHUTDOWN_SENTINEL};
use log::warn;
use structopt::StructOpt;

use super::util::EngineArgs;
use super::Command;

/// Printed in place of a move when none could be produced.
const NULL_MOVE: &str = "0000";

#[derive(StructOpt)]
pub struct ServeArgs {
    #[structopt(flatten)]
    pub engine: EngineArgs,
}

impl Command for ServeArgs {
    fn execute(self) -> Result<(), String> {
        let engine = Engine::new(self.engine.engine_config()).map_err(|e| e.to_string())?;
        let worker = SearchWorker::spawn(engine).map_err(|e| e.to_string())?;

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line.map_err(|e| e.to_string())?;
            let fen = line.trim();
            if fen.is_empty() {
                continue;
            }
            if fen == SHUTDOWN_SENTINEL {
                break;
            }

            let response = match worker.request_move(fen) {
                Ok(uci) => uci,
                Err(error) => {
                    warn!("no move for `{}`: {}", fen, error);
                    NULL_MOVE.to_string()
                }
            };
            writeln!(stdout, "{}", response).map_err(|e| e.to_string())?;
            stdout.flush().map_err(|e| e.to_string())?;
        }

        Ok(())
    }
}
