//! Progress reporting and cooperative cancellation shared by all solvers.

use crate::cust_error::ProcessingError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The default minimum amount of progress between two callbacks.
pub const DEFAULT_STEP: f64 = 0.01;

/// A cancellation flag shared between the caller and a running computation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Returns `Err(ProcessingError::Cancelled)` once the token was cancelled.
    pub fn check(&self) -> Result<(), ProcessingError> {
        if self.is_cancelled() {
            return Err(ProcessingError::Cancelled)
        }
        Ok(())
    }
}

/// Calls a progress callback whenever the progress advanced by at least `step` since the last
/// call. Reported values are clamped to `[0, 1]` and never decrease.
pub struct ProgressNotifier<'a> {
    goal: f64,
    step: f64,
    last: f64,
    callback: &'a mut dyn FnMut(f64),
}

impl<'a> ProgressNotifier<'a> {

    pub fn new(goal: f64, step: f64, callback: &'a mut dyn FnMut(f64)) -> Self {
        ProgressNotifier {
            goal,
            step,
            last: 0.0,
            callback,
        }
    }

    /// Reports `current` out of the goal.
    pub fn update(&mut self, current: f64) {
        let progress = if self.goal > 0.0 { (current / self.goal).min(1.0) } else { 1.0 };
        self.report(progress);
    }

    /// Reports a progress value in `[0, 1]` directly.
    pub fn report(&mut self, progress: f64) {
        if progress - self.last >= self.step {
            self.last = progress;
            (self.callback)(progress);
        }
    }

    /// Reports completion unless it was already reported.
    pub fn finish(&mut self) {
        if self.last < 1.0 {
            self.last = 1.0;
            (self.callback)(1.0);
        }
    }
}
