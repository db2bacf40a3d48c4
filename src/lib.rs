pub mod book;
pub mod engine;
pub mod evaluate;
pub mod position;
pub mod search;
pub mod worker;

#[cfg(feature = "instrumentation")]
pub mod instrumentation;
