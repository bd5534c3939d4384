//! The boundary of the engine. A `Request` is executed on its own thread, which streams
//! `Response`s back: zero or more `Progress` messages followed by exactly one final message.
//! A cancelled request sends nothing after the cancellation.

use crate::bounded_search::{exact_cover, exact_cover_kernelized};
use crate::config::{CoverMode, EngineConfig};
use crate::connectivity::make_connected;
use crate::cust_error::ProcessingError;
use crate::graph::{AdjacencyMatrix, Cover, RawAdjacencyMatrix};
use crate::heuristics::take_two;
use crate::progress::CancelToken;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use tracing::{debug, info_span, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Request {
    #[serde(rename_all = "camelCase")]
    ComputeVertexCover {
        matrix: RawAdjacencyMatrix,
        /// Negative sizes are accepted and answered with "no cover".
        target_size: i64,
        mode: CoverMode,
    },
    MakeConnected {
        matrix: RawAdjacencyMatrix,
    },
    #[serde(rename_all = "camelCase")]
    GenerateRandomGraph {
        vertex_count: usize,
        density: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Response {
    Progress { value: f64 },
    /// Final message of `ComputeVertexCover`. `None` only for the exact modes.
    Done { cover: Option<Cover> },
    /// Final message of `MakeConnected` and `GenerateRandomGraph`.
    Matrix { matrix: RawAdjacencyMatrix },
    /// Final message of a request with malformed input.
    Failed { message: String },
}

impl Response {

    /// Checks if no further message follows `self`.
    pub fn is_final(&self) -> bool {
        !matches!(self, Response::Progress { .. })
    }
}

fn import(raw: &RawAdjacencyMatrix) -> Result<AdjacencyMatrix, ProcessingError> {
    AdjacencyMatrix::from_raw(raw).map_err(|e| ProcessingError::InvalidParameter(e.to_string()))
}

/// Executes `request` and returns its final message. Progress goes to `sink` directly.
fn execute(request: Request, config: &EngineConfig, cancel: &CancelToken, sink: &mut dyn FnMut(Response)) -> Result<Response, ProcessingError> {
    let step = config.progress_step;
    match request {
        Request::ComputeVertexCover { matrix, target_size, mode } => {
            let matrix = import(&matrix)?;
            let mut on_progress = |value: f64| sink(Response::Progress { value });
            let cover = match (mode, usize::try_from(target_size)) {
                (CoverMode::Approximate, _) => Some(take_two(&matrix, step, &mut on_progress, cancel)?),
                (_, Err(_)) => None,
                (CoverMode::Exact, Ok(k)) => exact_cover(&matrix, k, step, &mut on_progress, cancel)?,
                (CoverMode::ExactKernelized, Ok(k)) => exact_cover_kernelized(&matrix, k, step, &mut on_progress, cancel)?,
            };
            Ok(Response::Done { cover })
        }
        Request::MakeConnected { matrix } => {
            let mut matrix = import(&matrix)?;
            make_connected(&mut matrix, cancel)?;
            Ok(Response::Matrix { matrix: matrix.to_raw() })
        }
        Request::GenerateRandomGraph { vertex_count, density } => {
            let matrix = AdjacencyMatrix::generate_random(vertex_count, density)?;
            cancel.check()?;
            Ok(Response::Matrix { matrix: matrix.to_raw() })
        }
    }
}

/// Runs `request` on the calling thread. Every message goes to `sink`, the final one last.
/// Malformed input ends in `Response::Failed`. Returns `Err(ProcessingError::Cancelled)` without
/// a final message if `cancel` was triggered.
pub fn run(request: Request, config: &EngineConfig, cancel: &CancelToken, sink: &mut dyn FnMut(Response)) -> Result<(), ProcessingError> {
    let mut guarded = |response: Response| {
        if !cancel.is_cancelled() {
            sink(response);
        }
    };
    match execute(request, config, cancel, &mut guarded) {
        Ok(_) if cancel.is_cancelled() => Err(ProcessingError::Cancelled),
        Ok(done) => {
            guarded(done);
            Ok(())
        }
        Err(ProcessingError::Cancelled) => Err(ProcessingError::Cancelled),
        Err(e) => {
            guarded(Response::Failed { message: e.to_string() });
            Ok(())
        }
    }
}

/// A request running on a background thread.
///
/// Dropping the handle cancels the request and waits for the thread to stop.
pub struct WorkerHandle {
    id: Uuid,
    receiver: Receiver<Response>,
    cancel: CancelToken,
    thread: Option<JoinHandle<()>>,
}

pub struct Worker;

impl Worker {

    /// Starts `request` on a new thread.
    pub fn spawn(request: Request, config: &EngineConfig) -> WorkerHandle {
        let id = Uuid::new_v4();
        let (sender, receiver) = mpsc::channel();
        let cancel = CancelToken::new();
        let token = cancel.clone();
        let config = config.clone();
        let thread = thread::spawn(move || {
            let span = info_span!("worker", request_id = %id);
            let _enter = span.enter();
            let mut send = |response: Response| {
                // The receiver is gone once the handle was dropped.
                let _ = sender.send(response);
            };
            if run(request, &config, &token, &mut send).is_err() {
                debug!("request cancelled");
            }
        });
        WorkerHandle {
            id,
            receiver,
            cancel,
            thread: Some(thread),
        }
    }
}

impl WorkerHandle {

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Blocks until the next message arrives. Returns `None` once the worker is done.
    pub fn recv(&self) -> Option<Response> {
        self.receiver.recv().ok()
    }

    /// Returns an iterator over all remaining messages, ending with the final one.
    pub fn iter(&self) -> impl Iterator<Item=Response> + '_ {
        self.receiver.iter()
    }

    /// Waits for the request to finish and returns all remaining messages.
    pub fn join(self) -> Vec<Response> {
        self.iter().collect()
    }

    /// Cancels the request and waits for the thread to stop. No message can be received
    /// afterwards.
    pub fn cancel(self) {
        debug!(request_id = %self.id, "cancelling request");
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!(request_id = %self.id, "worker thread panicked");
            }
        }
    }
}
