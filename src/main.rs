use std::process;

use structopt::StructOpt;

mod cli;

use cli::commands::Command;
use cli::ChessNegamax;

fn main() {
    env_logger::init();
    start_instrumentation();

    let result = ChessNegamax::from_args().execute();

    finish_instrumentation();
    if let Err(error) = result {
        eprintln!("{}", error);
        process::exit(1);
    }
}

#[cfg(feature = "instrumentation")]
fn start_instrumentation() {
    if let Err(error) = chess_negamax::instrumentation::init_tracing() {
        log::warn!("span timing disabled: {}", error);
    }
}

#[cfg(not(feature = "instrumentation"))]
fn start_instrumentation() {}

#[cfg(feature = "instrumentation")]
fn finish_instrumentation() {
    chess_negamax::instrumentation::print_timing_statistics();
}

#[cfg(not(feature = "instrumentation"))]
fn finish_instrumentation() {}
