//! Implementation of the bounded search tree for covers of an exact size.

use crate::cust_error::ProcessingError;
use crate::graph::{AdjacencyMatrix, Cover};
use crate::progress::{CancelToken, ProgressNotifier};
use crate::vc_instance::VCInstance;
use tracing::{debug, info};

/// Returns the binomial coefficient `C(n, r)` as a float, `0` if `r > n`.
pub fn combinations(n: usize, r: usize) -> f64 {
    if r > n {
        return 0.0
    }
    let r = r.min(n - r);
    (1..=r).fold(1.0, |acc, i| acc * (n - r + i) as f64 / i as f64)
}

/// State of one search: the partial cover and how many leaves were reached so far.
struct SearchState<'s, 'm, 'p> {
    instance: &'s VCInstance<'m>,
    cover: Vec<usize>,
    in_cover: Vec<bool>,
    leaves: u64,
    notifier: ProgressNotifier<'p>,
    cancel: &'s CancelToken,
}

impl SearchState<'_, '_, '_> {

    fn is_covered(&self) -> bool {
        self.instance.matrix
            .edge_indices()
            .all(|(a, b)| self.in_cover[a] || self.in_cover[b])
    }

    /// Checks if the partial cover ends the current branch: `Some(true)` for a solution,
    /// `Some(false)` if the target can no longer be met exactly.
    fn leaf(&mut self, index: usize) -> Option<bool> {
        let target = self.instance.target;
        if self.cover.len() >= target {
            self.leaves += 1;
            return Some(self.cover.len() == target && self.is_covered())
        }
        let remaining = self.instance.candidates.len() - index;
        if self.cover.len() + remaining < target {
            self.leaves += 1;
            return Some(false)
        }
        None
    }

    /// Returns `Ok(true)` once `self.cover` holds a solution.
    ///
    /// Candidates are included before they are excluded. The open decisions live on a heap
    /// allocated stack of `(index, included)` pairs, so the search depth is not limited by the
    /// thread's stack.
    fn search(&mut self) -> Result<bool, ProcessingError> {
        let mut decisions: Vec<(usize, bool)> = Vec::with_capacity(self.instance.candidates.len());
        let mut index = 0;
        loop {
            self.cancel.check()?;
            self.notifier.update(self.leaves as f64);
            match self.leaf(index) {
                Some(true) => return Ok(true),
                None => {
                    let node = self.instance.candidates[index];
                    self.cover.push(node);
                    self.in_cover[node] = true;
                    decisions.push((index, true));
                    index += 1;
                }
                Some(false) => loop {
                    match decisions.pop() {
                        None => return Ok(false),
                        Some((_, false)) => continue,
                        Some((decided, true)) => {
                            let node = self.instance.candidates[decided];
                            self.cover.pop();
                            self.in_cover[node] = false;
                            decisions.push((decided, false));
                            index = decided + 1;
                            break
                        }
                    }
                },
            }
        }
    }
}

impl VCInstance<'_> {

    /// Searches for a cover of exactly `self.target` vertices containing all forced vertices.
    /// Candidates are decided in order, including a candidate before excluding it, so the result
    /// is deterministic.
    ///
    /// `on_progress` receives the fraction of the `C(candidates, target - forced)` leaves visited,
    /// whenever it grew by at least `step`.
    /// Returns `Ok(None)` if no such cover exists and `Err(ProcessingError::Cancelled)` if `cancel`
    /// was triggered.
    pub fn solve_exact(&self, step: f64, on_progress: &mut dyn FnMut(f64), cancel: &CancelToken) -> Result<Option<Cover>, ProcessingError> {
        let remaining = match self.remaining_target() {
            Some(remaining) if self.target <= self.matrix.len() => remaining,
            _ => return Ok(None),
        };
        let goal = combinations(self.candidates.len(), remaining);
        debug!(target = self.target, forced = self.forced.len(), candidates = self.candidates.len(), goal, "starting exact search");
        let mut in_cover = vec![false; self.matrix.len()];
        for v in &self.forced {
            in_cover[*v] = true;
        }
        let mut state = SearchState {
            instance: self,
            cover: self.forced.clone(),
            in_cover,
            leaves: 0,
            notifier: ProgressNotifier::new(goal, step, on_progress),
            cancel,
        };
        let found = state.search()?;
        state.notifier.finish();
        info!(target = self.target, leaves = state.leaves, found, "exact search finished");
        if found {
            return Ok(Some(self.to_cover(&state.cover)))
        }
        Ok(None)
    }
}

/// Finds a cover of exactly `k` vertices of `matrix`, or `None` if there is none.
pub fn exact_cover(matrix: &AdjacencyMatrix, k: usize, step: f64, on_progress: &mut dyn FnMut(f64), cancel: &CancelToken) -> Result<Option<Cover>, ProcessingError> {
    VCInstance::new(matrix, k).solve_exact(step, on_progress, cancel)
}

/// Like `exact_cover`, but reduces the instance first. See `kernelization` for the cases in which
/// this misses a cover larger than the minimum.
pub fn exact_cover_kernelized(matrix: &AdjacencyMatrix, k: usize, step: f64, on_progress: &mut dyn FnMut(f64), cancel: &CancelToken) -> Result<Option<Cover>, ProcessingError> {
    if k > matrix.len() {
        return Ok(None)
    }
    match VCInstance::kernelize(matrix, k) {
        Ok(instance) => instance.solve_exact(step, on_progress, cancel),
        Err(ProcessingError::KernelBoundExceeded { uncovered, bound }) => {
            debug!(uncovered, bound, "no cover within the kernel bound");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
