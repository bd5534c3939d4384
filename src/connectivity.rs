//! Connected components of an `AdjacencyMatrix` and the repair of disconnected matrices.

use crate::cust_error::ProcessingError;
use crate::graph::AdjacencyMatrix;
use crate::progress::CancelToken;
use std::collections::VecDeque;
use tracing::debug;

/// Labels the components breadth first, starting each one at the first unvisited vertex in matrix
/// order. Returns the vertex indices of every component in discovery order; the first entry of a
/// component is its representative.
fn label_components(matrix: &AdjacencyMatrix, cancel: &CancelToken) -> Result<Vec<Vec<usize>>, ProcessingError> {
    let mut component: Vec<Option<usize>> = vec![None; matrix.len()];
    let mut components = Vec::new();
    for start in 0..matrix.len() {
        cancel.check()?;
        if component[start].is_some() {
            continue
        }
        let id = components.len();
        let mut members = vec![start];
        component[start] = Some(id);
        let mut queue = VecDeque::from([start]);
        while let Some(next) = queue.pop_front() {
            for neigh in matrix.neighbors_idx(next) {
                if component[neigh].is_none() {
                    component[neigh] = Some(id);
                    members.push(neigh);
                    queue.push_back(neigh);
                }
            }
        }
        components.push(members);
    }
    Ok(components)
}

/// Returns the connected components as lists of vertex ids, in discovery order.
pub fn components(matrix: &AdjacencyMatrix) -> Vec<Vec<String>> {
    label_components(matrix, &CancelToken::new())
        .expect("a fresh token is never cancelled")
        .into_iter()
        .map(|members| members.into_iter().map(|v| matrix.vertex(v).to_owned()).collect())
        .collect()
}

/// Connects all components of `matrix` in place by adding an edge from the representative of the
/// first component to the representative of every other one. Already connected matrices are left
/// untouched.
/// Returns the number of added edges.
pub fn make_connected(matrix: &mut AdjacencyMatrix, cancel: &CancelToken) -> Result<usize, ProcessingError> {
    let components = label_components(matrix, cancel)?;
    let representatives: Vec<usize> = components.iter().map(|members| members[0]).collect();
    if let Some((first, others)) = representatives.split_first() {
        for other in others {
            matrix.set_edge_idx(*first, *other, true);
        }
    }
    let added = representatives.len().saturating_sub(1);
    debug!(components = components.len(), added, "made connected");
    Ok(added)
}

impl AdjacencyMatrix {

    /// Checks if every vertex can reach every other vertex. The empty matrix is connected.
    pub fn is_connected(&self) -> bool {
        components(self).len() <= 1
    }

    /// Returns a connected copy of `self`.
    pub fn connected(&self) -> AdjacencyMatrix {
        let mut clone = self.clone();
        make_connected(&mut clone, &CancelToken::new()).expect("a fresh token is never cancelled");
        clone
    }
}
