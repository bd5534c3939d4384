use crate::cust_error::ProcessingError;
use crate::graph::{AdjacencyMatrix, Cover};
use std::io::{self, Write};

/// An instance of the exact-size vertex cover problem: find `target` vertices, including all of
/// `forced`, chosen from `forced` and `candidates`, that cover every edge of `matrix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VCInstance<'m> {
    pub matrix: &'m AdjacencyMatrix,
    /// Vertex indices the search may still decide on, in discovery order.
    pub candidates: Vec<usize>,
    /// Vertex indices that are part of every cover this instance produces.
    pub forced: Vec<usize>,
    pub target: usize,
}

impl<'m> VCInstance<'m> {

    /// Creates an instance where every vertex is a candidate.
    pub fn new(matrix: &'m AdjacencyMatrix, target: usize) -> Self {
        VCInstance {
            matrix,
            candidates: (0..matrix.len()).collect(),
            forced: Vec::new(),
            target,
        }
    }

    /// Creates an instance from explicit candidate and forced vertex ids. Candidates that are
    /// also forced are dropped.
    pub fn with_forced<S: AsRef<str>>(matrix: &'m AdjacencyMatrix, target: usize, candidates: &[S], forced: &Cover) -> Result<Self, ProcessingError> {
        let lookup = |vertex: &str| matrix.index_of(vertex).ok_or_else(|| ProcessingError::UnknownVertex(vertex.to_owned()));
        let mut forced_idx = forced.iter().map(|v| lookup(v.as_str())).collect::<Result<Vec<_>, _>>()?;
        forced_idx.sort_unstable();
        let mut candidates_idx = Vec::with_capacity(candidates.len());
        for vertex in candidates {
            let idx = lookup(vertex.as_ref())?;
            if !forced_idx.contains(&idx) && !candidates_idx.contains(&idx) {
                candidates_idx.push(idx);
            }
        }
        Ok(VCInstance {
            matrix,
            candidates: candidates_idx,
            forced: forced_idx,
            target,
        })
    }

    /// Returns how many vertices the search still has to pick, or `None` if the forced vertices
    /// alone exceed the target.
    pub fn remaining_target(&self) -> Option<usize> {
        self.target.checked_sub(self.forced.len())
    }

    /// Returns a membership mask of the forced vertices.
    pub(crate) fn forced_mask(&self) -> Vec<bool> {
        let mut mask = vec![false; self.matrix.len()];
        for v in &self.forced {
            mask[*v] = true;
        }
        mask
    }

    /// Counts the edges without a forced endpoint.
    pub fn uncovered_edges(&self) -> usize {
        let mask = self.forced_mask();
        self.matrix.edge_indices().filter(|(a, b)| !mask[*a] && !mask[*b]).count()
    }

    /// Translates vertex indices into a cover of vertex ids.
    pub(crate) fn to_cover(&self, vertices: &[usize]) -> Cover {
        vertices.iter().map(|v| self.matrix.vertex(*v).to_owned()).collect()
    }

    /// Checks if `sol` is a solution of `self`: exactly `target` vertices, all forced vertices
    /// included, every edge covered.
    pub fn validate_solution(&self, sol: &Cover) -> bool {
        sol.len() == self.target
            && self.forced.iter().all(|v| sol.contains(self.matrix.vertex(*v)))
            && self.matrix.validate_cover(sol)
    }
}

impl VCInstance<'_> {

    /// Writes a solution to a `Write` type, one vertex id per line in sorted order.
    pub fn write_solution<W: Write>(solution: &Cover, mut out: W) -> Result<(), io::Error> {
        let mut sorted: Vec<&String> = solution.iter().collect();
        sorted.sort();
        for elem in sorted {
            writeln!(out, "{}", elem)?;
        }
        Ok(())
    }
}
