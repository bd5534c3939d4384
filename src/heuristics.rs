//! Implementation of the "take two" approximation for the Vertex Cover Problem.

use crate::cust_error::ProcessingError;
use crate::graph::{AdjacencyMatrix, Cover};
use crate::progress::{CancelToken, ProgressNotifier};
use fxhash::FxHashSet;
use tracing::debug;

/// Approximates a minimum vertex cover by repeatedly taking both endpoints of an uncovered edge
/// and dropping every edge incident to either of them. The picked edges form a maximal
/// matching, so the result is at most twice as large as a minimum cover.
///
/// Edges are picked in matrix order. `on_progress` receives the fraction of edges covered so far
/// whenever it grew by at least `step`.
pub fn take_two(matrix: &AdjacencyMatrix, step: f64, on_progress: &mut dyn FnMut(f64), cancel: &CancelToken) -> Result<Cover, ProcessingError> {
    let edges: Vec<(usize, usize)> = matrix.edge_indices().collect();
    let initial = edges.len();
    let mut removed: FxHashSet<(usize, usize)> = FxHashSet::default();
    let mut in_cover = vec![false; matrix.len()];
    let mut notifier = ProgressNotifier::new(initial as f64, step, on_progress);
    let mut cursor = 0;
    loop {
        cancel.check()?;
        while cursor < edges.len() && removed.contains(&edges[cursor]) {
            cursor += 1;
        }
        if cursor == edges.len() {
            break
        }
        let (a, b) = edges[cursor];
        for node in [a, b] {
            in_cover[node] = true;
            for neigh in matrix.neighbors_idx(node) {
                removed.insert((node.min(neigh), node.max(neigh)));
            }
        }
        cancel.check()?;
        notifier.update(removed.len() as f64);
    }
    notifier.finish();
    let cover: Cover = (0..matrix.len())
        .filter(|v| in_cover[*v])
        .map(|v| matrix.vertex(v).to_owned())
        .collect();
    debug!(edges = initial, cover = cover.len(), "take two finished");
    Ok(cover)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounded_search::exact_cover;
    use crate::graph::Edge;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn approx(m: &AdjacencyMatrix) -> Cover {
        take_two(m, 0.01, &mut |_| {}, &CancelToken::new()).unwrap()
    }

    #[test]
    fn empty_test() {
        assert!(approx(&AdjacencyMatrix::default()).is_empty());
        assert!(approx(&AdjacencyMatrix::generate_random(4, 0.0).unwrap()).is_empty());
    }

    #[test]
    fn clique_test() {
        let m = AdjacencyMatrix::generate_random(5, 1.0).unwrap();
        let cover = approx(&m);
        assert_eq!(cover.len(), 4);
        assert!(m.validate_cover(&cover));
    }

    #[test]
    fn path_test() {
        let m = AdjacencyMatrix::from_vertices_and_edges(
            &["a", "b", "c"],
            &[Edge::new("a", "b"), Edge::new("b", "c")],
        ).unwrap();
        let cover = approx(&m);
        assert_eq!(cover, vec!["a".to_owned(), "b".to_owned()].into_iter().collect());
    }

    #[test]
    fn two_approx_bound_test() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..30 {
            let n = rng.gen_range(1..9);
            let m = AdjacencyMatrix::generate_random(n, rng.gen_range(0.0..1.0)).unwrap();
            let cover = approx(&m);
            assert!(m.validate_cover(&cover));
            let min = (0..=n)
                .find(|k| exact_cover(&m, *k, 0.01, &mut |_| {}, &CancelToken::new()).unwrap().is_some())
                .unwrap();
            assert!(cover.len() <= 2 * min);
        }
    }

    #[test]
    fn progress_reaches_one_test() {
        let m = AdjacencyMatrix::generate_random(30, 0.5).unwrap();
        let mut seen = Vec::new();
        take_two(&m, 0.05, &mut |p| seen.push(p), &CancelToken::new()).unwrap();
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last().copied(), Some(1.0));
    }

    #[test]
    fn cancel_test() {
        let m = AdjacencyMatrix::generate_random(5, 1.0).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(take_two(&m, 0.01, &mut |_| {}, &cancel), Err(ProcessingError::Cancelled));
    }

    #[test]
    fn cancel_during_iteration_test() {
        let m = AdjacencyMatrix::generate_random(20, 1.0).unwrap();
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let mut calls = 0;
        let res = take_two(&m, 0.01, &mut |_| { calls += 1; trigger.cancel(); }, &cancel);
        assert_eq!(res, Err(ProcessingError::Cancelled));
        assert_eq!(calls, 1);
    }
}
