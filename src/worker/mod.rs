//! Runs an [`Engine`] on its own thread.
//!
//! Callers send a FEN and block until the UCI move comes back. Only one
//! request may be outstanding per worker; a concurrent request is turned away
//! with [`WorkerError::Busy`] instead of waiting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};
use thiserror::Error;

use crate::engine::{Engine, EngineError};
use crate::search::CancellationToken;

/// A request carrying this text stops the worker instead of searching.
pub const SHUTDOWN_SENTINEL: &str = "quit";

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("a move request is already in flight")]
    Busy,
    #[error("the search worker has shut down")]
    Disconnected,
    #[error("failed to start the search worker: {0}")]
    Spawn(#[from] std::io::Error),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

enum WorkerMessage {
    Request(String),
    Shutdown,
}

pub struct SearchWorker {
    requests: Sender<WorkerMessage>,
    responses: Receiver<Result<String, EngineError>>,
    in_flight: AtomicBool,
    cancellation: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl SearchWorker {
    pub fn spawn(engine: Engine) -> Result<Self, WorkerError> {
        let (request_sender, request_receiver) = unbounded();
        let (response_sender, response_receiver) = unbounded();
        let cancellation = engine.cancellation_token();

        let handle = thread::Builder::new()
            .name("search-worker".to_string())
            .spawn(move || run(engine, request_receiver, response_sender))?;

        Ok(Self {
            requests: request_sender,
            responses: response_receiver,
            in_flight: AtomicBool::new(false),
            cancellation,
            handle: Some(handle),
        })
    }

    /// Sends a FEN to the worker and waits for its move in UCI notation.
    ///
    /// Sending [`SHUTDOWN_SENTINEL`] stops the worker; that call and every
    /// later one return [`WorkerError::Disconnected`].
    pub fn request_move(&self, fen: &str) -> Result<String, WorkerError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(WorkerError::Busy);
        }
        let _guard = InFlight(&self.in_flight);
        // A cancel sent while idle must not abort this request.
        self.cancellation.reset();

        let fen = fen.trim();
        let message = if fen == SHUTDOWN_SENTINEL {
            WorkerMessage::Shutdown
        } else {
            WorkerMessage::Request(fen.to_string())
        };
        let shutting_down = matches!(message, WorkerMessage::Shutdown);

        self.requests
            .send(message)
            .map_err(|_| WorkerError::Disconnected)?;
        if shutting_down {
            return Err(WorkerError::Disconnected);
        }

        let response = self
            .responses
            .recv()
            .map_err(|_| WorkerError::Disconnected)?;
        Ok(response?)
    }

    /// True while a request is being served.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Interrupts the request currently being searched. Has no effect on
    /// requests made afterwards.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }
}

/// Frees the request slot when the request finishes, however it finishes.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) {
        // The worker may already be gone after a shutdown request.
        let _ = self.requests.send(WorkerMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("search worker panicked");
            }
        }
    }
}

fn run(
    mut engine: Engine,
    requests: Receiver<WorkerMessage>,
    responses: Sender<Result<String, EngineError>>,
) {
    debug!("search worker started");
    for message in requests.iter() {
        match message {
            WorkerMessage::Request(fen) => {
                let response = engine.request_move_fen(&fen);
                if responses.send(response).is_err() {
                    break;
                }
            }
            WorkerMessage::Shutdown => break,
        }
    }
    debug!("search worker stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::engine::EngineConfig;
    use crate::search::{SearchConfig, SearchError};

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn worker(depth: u8) -> SearchWorker {
        let config = EngineConfig {
            search: SearchConfig::with_depth(depth),
            book_path: None,
            seed: Some(5),
        };
        SearchWorker::spawn(Engine::with_book(config, None)).unwrap()
    }

    #[test]
    fn test_request_returns_uci_move() {
        let worker = worker(2);
        let uci = worker
            .request_move("6k1/5ppp/8/8/8/8/5PPP/1R4K1 w - - 0 1")
            .unwrap();
        assert_eq!(uci, "b1b8");

        // The worker keeps serving after a response.
        let uci = worker.request_move(START_FEN).unwrap();
        assert_eq!(uci.len(), 4);
    }

    #[test]
    fn test_engine_errors_are_forwarded() {
        let worker = worker(2);
        assert!(matches!(
            worker.request_move("R6k/6pp/8/8/8/8/8/K7 b - - 0 1"),
            Err(WorkerError::Engine(EngineError::Search(SearchError::NoLegalMoves)))
        ));
        assert!(worker.request_move(START_FEN).is_ok());
    }

    #[test]
    fn test_sentinel_shuts_worker_down() {
        let worker = worker(1);
        assert!(matches!(
            worker.request_move(SHUTDOWN_SENTINEL),
            Err(WorkerError::Disconnected)
        ));
        assert!(matches!(
            worker.request_move(START_FEN),
            Err(WorkerError::Disconnected)
        ));
    }

    #[test]
    fn test_concurrent_request_is_rejected() {
        let worker = Arc::new(worker(8));

        let searching = {
            let worker = Arc::clone(&worker);
            thread::spawn(move || worker.request_move(START_FEN))
        };

        while !worker.is_busy() {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(matches!(
            worker.request_move(START_FEN),
            Err(WorkerError::Busy)
        ));

        // Keep cancelling until the search notices, in case the first cancel
        // lands before the request reaches the engine.
        while !searching.is_finished() {
            worker.cancel();
            thread::sleep(Duration::from_millis(1));
        }
        assert!(matches!(
            searching.join().unwrap(),
            Err(WorkerError::Engine(EngineError::Search(SearchError::Cancelled)))
        ));
    }

    #[test]
    fn test_idle_cancel_does_not_abort_next_request() {
        let worker = worker(1);
        worker.cancel();
        assert!(worker.request_move(START_FEN).is_ok());

        worker.cancel();
        worker.cancel();
        let uci = worker
            .request_move("6k1/5ppp/8/8/8/8/5PPP/1R4K1 w - - 0 1")
            .unwrap();
        assert_eq!(uci, "b1b8");
    }
}
