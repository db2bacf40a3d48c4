//! Engine options shared by every command.

use std::path::PathBuf;
use std::time::Duration;

use chess_negamax::engine::EngineConfig;
use chess_negamax::search::SearchConfig;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
pub struct EngineArgs {
    /// Nominal search depth in plies
    #[structopt(short, long, default_value = "2")]
    pub depth: u8,
    /// How many plies captures and checks may extend past the nominal depth
    #[structopt(long, default_value = "3")]
    pub quiescence_depth: u8,
    /// Polyglot opening book consulted before searching
    #[structopt(long, parse(from_os_str))]
    pub book: Option<PathBuf>,
    /// Seed for book choices and move shuffling
    #[structopt(long)]
    pub seed: Option<u64>,
    /// Search root moves in parallel
    #[structopt(long)]
    pub parallel: bool,
    /// Abandon a search after this many milliseconds
    #[structopt(long)]
    pub time_limit_ms: Option<u64>,
}

impl EngineArgs {
    pub(crate) fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            search: SearchConfig {
                depth: self.depth,
                quiescence_depth: self.quiescence_depth,
                parallel: self.parallel,
                time_limit: self.time_limit_ms.map(Duration::from_millis),
                ..SearchConfig::default()
            },
            book_path: self.book.clone(),
            seed: self.seed,
        }
    }
}
