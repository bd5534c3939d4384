//! This module includes the reduction rules used before the exact search, and a set of
//! matrix mutations that let a user explore those rules by hand.
//!
//! The reduction is a single pass over the vertices sorted ascending by degree:
//! * Isolated vertices are removed from the candidates.
//! * A pendant (degree 1) puts its neighbor into the cover. Both leave the candidates.
//! * A vertex with more uncovered neighbors than the remaining target has to be in every cover of
//! that size (Buss rule).
//! Afterwards more than `k²` uncovered edges prove that no cover of size `k` exists.
//!
//! Known limitation: vertices removed by the pass are never used to pad a cover. For a `k` above
//! the minimum the reduced instance may have no solution although the unreduced one has. Two
//! adjacent vertices and `k = 2` is the smallest example.
//!
//! The exploration helpers (`add_pendant`, `remove_pendant`, `add_top`, `remove_top`) are
//! heuristics. They come in forward/inverse pairs but undoing one with the other is not
//! guaranteed to give back the matrix it started from.

use crate::cust_error::ProcessingError;
use crate::graph::{AdjacencyMatrix, Edge};
use crate::vc_instance::VCInstance;
use tracing::{debug, trace};

impl<'m> VCInstance<'m> {

    /// Reduces the instance of finding a cover of size `k` in `matrix`.
    ///
    /// Returns `ProcessingError::KernelBoundExceeded` if the reduction proves that no cover of
    /// size `k` exists.
    pub fn kernelize(matrix: &'m AdjacencyMatrix, k: usize) -> Result<Self, ProcessingError> {
        let n = matrix.len();
        let mut candidate = vec![true; n];
        let mut forced = vec![false; n];
        let mut forced_order = Vec::new();

        for vd in matrix.degrees_sorted() {
            let node = matrix.index_of(&vd.vertex).expect("`vd.vertex` is part of `matrix`");
            if forced[node] {
                continue
            }
            match vd.degree {
                0 => candidate[node] = false,
                1 => {
                    let neighbor = matrix.neighbors_idx(node).next().expect("`node`s degree is 1");
                    candidate[node] = false;
                    if !forced[neighbor] {
                        trace!(pendant = %vd.vertex, neighbor = matrix.vertex(neighbor), "pendant rule");
                        forced[neighbor] = true;
                        forced_order.push(neighbor);
                    }
                }
                degree => {
                    let remaining = match k.checked_sub(forced_order.len()) {
                        Some(remaining) => remaining,
                        None => break,
                    };
                    let uncovered_degree = matrix.neighbors_idx(node).filter(|v| !forced[*v]).count();
                    if degree >= remaining && uncovered_degree > remaining {
                        trace!(vertex = %vd.vertex, degree, uncovered_degree, remaining, "high degree rule");
                        forced[node] = true;
                        forced_order.push(node);
                    }
                }
            }
        }

        let candidates: Vec<usize> = (0..n).filter(|v| candidate[*v] && !forced[*v]).collect();
        let instance = VCInstance {
            matrix,
            candidates,
            forced: forced_order,
            target: k,
        };
        let uncovered = instance.uncovered_edges();
        let bound = k * k;
        debug!(k, forced = instance.forced.len(), candidates = instance.candidates.len(), uncovered, "kernelized");
        if instance.forced.len() > k || uncovered > bound {
            return Err(ProcessingError::KernelBoundExceeded { uncovered, bound })
        }
        Ok(instance)
    }
}

impl AdjacencyMatrix {

    /// Turns the vertex with the smallest degree in `(1, tops_degree)` into a pendant by removing
    /// all but its first edge.
    /// Returns the changed vertex, or `None` if no vertex qualifies.
    pub fn add_pendant(&mut self, tops_degree: usize) -> Option<String> {
        let mut best: Option<(usize, usize)> = None;
        for node in 0..self.len() {
            let degree = self.degree_idx(node);
            if degree > 1 && degree < tops_degree && best.map_or(true, |(_, d)| degree < d) {
                best = Some((node, degree));
            }
        }
        let (node, _) = best?;
        let surplus: Vec<usize> = self.neighbors_idx(node).skip(1).collect();
        for neigh in surplus {
            self.set_edge_idx(node, neigh, false);
        }
        Some(self.vertex(node).to_owned())
    }

    /// Gives a pendant a second edge. A pendant whose degree differs from its degree in
    /// `original` is preferred. An edge of `original` is restored if possible, otherwise an edge
    /// to the first non-neighbor is added.
    /// Returns the changed vertex, or `None` if there is no pendant or no edge could be added.
    pub fn remove_pendant(&mut self, original: &AdjacencyMatrix) -> Option<String> {
        let pendants: Vec<usize> = (0..self.len()).filter(|v| self.degree_idx(*v) == 1).collect();
        let node = pendants
            .iter()
            .copied()
            .find(|v| original.degree(self.vertex(*v)) != Some(1))
            .or_else(|| pendants.first().copied())?;
        let vertex = self.vertex(node).to_owned();
        let restorable = original
            .neighbors(&vertex)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|neigh| self.index_of(&neigh))
            .find(|neigh| *neigh != node && !self.has_edge_idx(node, *neigh));
        let target = restorable.or_else(|| {
            (0..self.len()).find(|v| *v != node && !self.has_edge_idx(node, *v))
        })?;
        self.set_edge_idx(node, target, true);
        Some(vertex)
    }

    /// Raises the vertex with the highest degree below `tops_degree` up to `tops_degree` by
    /// connecting it to non-neighbors in matrix order, until it reaches the threshold or there are
    /// no non-neighbors left.
    /// Returns the changed vertex, or `None` if every vertex is at or above the threshold.
    pub fn add_top(&mut self, tops_degree: usize) -> Option<String> {
        let mut best: Option<(usize, usize)> = None;
        for node in 0..self.len() {
            let degree = self.degree_idx(node);
            if degree < tops_degree && best.map_or(true, |(_, d)| degree > d) {
                best = Some((node, degree));
            }
        }
        let (node, mut degree) = best?;
        for other in 0..self.len() {
            if degree >= tops_degree {
                break
            }
            if other != node && !self.has_edge_idx(node, other) {
                self.set_edge_idx(node, other, true);
                degree += 1;
            }
        }
        Some(self.vertex(node).to_owned())
    }

    /// Lowers the vertex with the smallest degree at or above `tops_degree` below the threshold.
    /// Edges missing in `original` are removed first, then edges in matrix order.
    /// Returns the changed vertex, or `None` if no vertex is at or above the threshold or the
    /// degree can not drop below it.
    pub fn remove_top(&mut self, original: &AdjacencyMatrix, tops_degree: usize) -> Option<String> {
        if tops_degree == 0 {
            return None
        }
        let mut best: Option<(usize, usize)> = None;
        for node in 0..self.len() {
            let degree = self.degree_idx(node);
            if degree >= tops_degree && best.map_or(true, |(_, d)| degree < d) {
                best = Some((node, degree));
            }
        }
        let (node, mut degree) = best?;
        let vertex = self.vertex(node).to_owned();
        let neighbors: Vec<usize> = self.neighbors_idx(node).collect();
        let (added, kept): (Vec<usize>, Vec<usize>) = neighbors
            .into_iter()
            .partition(|neigh| !original.has_edge(&Edge::new(vertex.clone(), self.vertex(*neigh))));
        for neigh in added.into_iter().chain(kept) {
            if degree < tops_degree {
                break
            }
            self.set_edge_idx(node, neigh, false);
            degree -= 1;
        }
        Some(vertex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Cover;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn matrix(vertices: &[&str], edges: &[(&str, &str)]) -> AdjacencyMatrix {
        let edges: Vec<Edge> = edges.iter().map(|(a, b)| Edge::new(*a, *b)).collect();
        AdjacencyMatrix::from_vertices_and_edges(vertices, &edges).unwrap()
    }

    #[test]
    fn isolated_and_pendant_test() {
        // a - b - c, d isolated
        let m = matrix(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c")]);
        let ins = VCInstance::kernelize(&m, 1).unwrap();
        assert_eq!(ins.forced, vec![1]);
        assert!(ins.candidates.is_empty());
        assert_eq!(ins.uncovered_edges(), 0);
    }

    #[test]
    fn high_degree_test() {
        // A star with center `c` whose leaves form a 4-cycle.
        let m = matrix(
            &["c", "l1", "l2", "l3", "l4"],
            &[("c", "l1"), ("c", "l2"), ("c", "l3"), ("c", "l4"),
              ("l1", "l2"), ("l2", "l3"), ("l3", "l4"), ("l4", "l1")],
        );
        let ins = VCInstance::kernelize(&m, 3).unwrap();
        assert_eq!(ins.forced, vec![0]);
        assert_eq!(ins.candidates, vec![1, 2, 3, 4]);
    }

    #[test]
    fn four_cycle_is_not_forced_test() {
        let m = matrix(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")]);
        let ins = VCInstance::kernelize(&m, 2).unwrap();
        assert!(ins.forced.is_empty());
        assert_eq!(ins.candidates.len(), 4);
    }

    #[test]
    fn bound_exceeded_test() {
        // Three disjoint edges can not be covered by a single vertex.
        let m = matrix(&["a", "b", "c", "d", "e", "f"], &[("a", "b"), ("c", "d"), ("e", "f")]);
        let res = VCInstance::kernelize(&m, 1);
        assert!(matches!(res, Err(ProcessingError::KernelBoundExceeded { .. })));
        // Two triangles force nothing for `k = 2` but leave 6 > 2² uncovered edges.
        let m = matrix(
            &["a", "b", "c", "d", "e", "f"],
            &[("a", "b"), ("b", "c"), ("a", "c"), ("d", "e"), ("e", "f"), ("d", "f")],
        );
        assert_eq!(VCInstance::kernelize(&m, 2), Err(ProcessingError::KernelBoundExceeded { uncovered: 6, bound: 4 }));
    }

    #[test]
    fn forced_vertices_cover_by_construction_test() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let n = rng.gen_range(1..8);
            let mut m = AdjacencyMatrix::generate_random(n, 0.0).unwrap();
            for a in 0..n {
                for b in (a + 1)..n {
                    if rng.gen_bool(0.4) {
                        m.set_edge_idx(a, b, true);
                    }
                }
            }
            for k in 0..=n {
                if let Ok(ins) = VCInstance::kernelize(&m, k) {
                    assert!(ins.forced.len() <= k);
                    assert!(ins.candidates.iter().all(|c| !ins.forced.contains(c)));
                    let forced: Cover = ins.to_cover(&ins.forced);
                    assert_eq!(forced.len(), ins.forced.len());
                }
            }
        }
    }

    #[test]
    fn add_pendant_test() {
        let mut m = matrix(&["a", "b", "c", "d"], &[("a", "b"), ("a", "c"), ("a", "d"), ("b", "c")]);
        // `b` and `c` have degree 2, `b` comes first.
        assert_eq!(m.add_pendant(3), Some("b".to_owned()));
        assert_eq!(m.degree("b"), Some(1));
        assert!(m.has_edge(&Edge::new("a", "b")));
        assert_eq!(m.add_pendant(2), None);
    }

    #[test]
    fn remove_pendant_test() {
        let original = matrix(&["a", "b", "c", "d"], &[("a", "b"), ("a", "c"), ("a", "d"), ("b", "c")]);
        let mut m = original.clone();
        assert_eq!(m.add_pendant(3), Some("b".to_owned()));
        // `b` lost an edge, `d` is a pendant in both: `b` is preferred and `b - c` restored.
        assert_eq!(m.remove_pendant(&original), Some("b".to_owned()));
        assert!(m.has_edge(&Edge::new("b", "c")));

        // Only `d` is left as a pendant, it is connected to the first non-neighbor.
        assert_eq!(m.remove_pendant(&original), Some("d".to_owned()));
        assert!(m.has_edge(&Edge::new("b", "d")));

        let mut edgeless = matrix(&["a", "b"], &[]);
        assert_eq!(edgeless.remove_pendant(&original), None);
    }

    #[test]
    fn add_remove_top_test() {
        let original = matrix(&["a", "b", "c", "d", "e"], &[("a", "b"), ("a", "c"), ("d", "e")]);
        let mut m = original.clone();
        assert_eq!(m.add_top(4), Some("a".to_owned()));
        assert_eq!(m.degree("a"), Some(4));
        // The added edges go first.
        assert_eq!(m.remove_top(&original, 4), Some("a".to_owned()));
        assert_eq!(m.degree("a"), Some(3));
        assert!(m.has_edge(&Edge::new("a", "b")));
        assert!(m.has_edge(&Edge::new("a", "c")));
        assert_eq!(m.remove_top(&original, 4), None);
        assert_eq!(m.remove_top(&original, 0), None);
        let mut complete = AdjacencyMatrix::generate_random(3, 1.0).unwrap();
        assert_eq!(complete.add_top(2), None);
    }

    #[test]
    fn pendant_round_trip_is_best_effort_test() {
        // Undoing `add_pendant` is not asserted to give back the original matrix, only that the
        // helpers keep the matrix symmetric and loop free.
        let original = matrix(&["a", "b", "c", "d"], &[("a", "b"), ("a", "c"), ("b", "c"), ("c", "d"), ("b", "d")]);
        let mut m = original.clone();
        m.add_pendant(4);
        m.remove_pendant(&original);
        assert!(m.all_edges(|a, b| a != b));
        for e in m.edges() {
            assert!(m.has_edge(&Edge::new(e.vertex_b.clone(), e.vertex_a.clone())));
        }
    }
}
