//! Best move command - determine the engine's move from a position.

use chess_negamax::engine::Engine;
use structopt::StructOpt;

use super::util::EngineArgs;
use super::Command;

#[derive(StructOpt)]
pub struct BestMoveArgs {
    #[structopt(long)]
    pub fen: String,
    #[structopt(flatten)]
    pub engine: EngineArgs,
}

impl Command for BestMoveArgs {
    fn execute(self) -> Result<(), String> {
        let mut engine = Engine::new(self.engine.engine_config()).map_err(|e| e.to_string())?;
        let uci = engine
            .request_move_fen(&self.fen)
            .map_err(|e| format!("Failed to calculate best move: {}", e))?;
        println!("{}", uci);
        Ok(())
    }
}
