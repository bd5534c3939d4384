//! Implementation of a simple, undirected graph stored as a square boolean adjacency matrix over
//! string vertex ids, with basic static and dynamic functions.

use crate::cust_error::{ImportError, ProcessingError};
use fxhash::{FxHashMap, FxHashSet};
use rand::seq::index::sample;
use rand::{thread_rng, Rng};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The interchange shape of a matrix: row id -> column id -> connected.
/// Ids are kept in lexicographic order, so `"10"` comes before `"2"`.
pub type RawAdjacencyMatrix = BTreeMap<String, BTreeMap<String, bool>>;

/// A set of vertex ids. Valid for a matrix iff every edge has an endpoint in it.
pub type Cover = FxHashSet<String>;

/// An unordered pair of vertex ids.
#[derive(Debug, Clone)]
pub struct Edge {
    pub vertex_a: String,
    pub vertex_b: String,
}

impl Edge {

    pub fn new(vertex_a: impl Into<String>, vertex_b: impl Into<String>) -> Self {
        Edge {
            vertex_a: vertex_a.into(),
            vertex_b: vertex_b.into(),
        }
    }

    /// Returns both endpoints, the smaller id first.
    fn ordered(&self) -> (&str, &str) {
        if self.vertex_a <= self.vertex_b {
            (&self.vertex_a, &self.vertex_b)
        } else {
            (&self.vertex_b, &self.vertex_a)
        }
    }

    /// Returns the canonical form `min(a,b)-max(a,b)`.
    pub fn key(&self) -> String {
        let (a, b) = self.ordered();
        format!("{}-{}", a, b)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.ordered() == other.ordered()
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordered().hash(state);
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A vertex and its degree at the time of the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexDegree {
    pub vertex: String,
    pub degree: usize,
}

/// A symmetric boolean adjacency matrix without self loops.
///
/// The vertex order is fixed at construction and every iteration follows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyMatrix {
    vertices: Vec<String>,
    index: FxHashMap<String, usize>,
    /// `adj[n*r+c] == true` iff there is an edge between `vertices[r]` and `vertices[c]`.
    adj: Vec<bool>,
}

// Construction
impl AdjacencyMatrix {

    /// Creates an edgeless matrix over `vertices`.
    fn with_vertices(vertices: Vec<String>) -> Result<Self, ProcessingError> {
        let mut index = FxHashMap::default();
        for (i, vertex) in vertices.iter().enumerate() {
            if index.insert(vertex.clone(), i).is_some() {
                return Err(ProcessingError::InvalidParameter(format!("duplicate vertex `{}`", vertex)))
            }
        }
        let n = vertices.len();
        Ok(AdjacencyMatrix {
            vertices,
            index,
            adj: vec![false; n * n],
        })
    }

    /// Builds a matrix over `vertices` where exactly the given `edges` are set.
    pub fn from_vertices_and_edges<S: AsRef<str>>(vertices: &[S], edges: &[Edge]) -> Result<Self, ProcessingError> {
        let mut matrix = Self::with_vertices(vertices.iter().map(|v| v.as_ref().to_owned()).collect())?;
        for edge in edges {
            let (a, b) = match (matrix.index_of(&edge.vertex_a), matrix.index_of(&edge.vertex_b)) {
                (Some(a), Some(b)) if a != b => (a, b),
                _ => return Err(ProcessingError::InvalidEdge(edge.key())),
            };
            matrix.set_edge_idx(a, b, true);
        }
        Ok(matrix)
    }

    /// Generates a matrix over the vertices `"0".."n-1"` where every unordered pair is connected
    /// independently with probability `density`.
    pub fn generate_random(n: usize, density: f64) -> Result<Self, ProcessingError> {
        check_density(density)?;
        let mut matrix = Self::with_vertices((0..n).map(|i| i.to_string()).collect())?;
        let mut rng = thread_rng();
        for i in 0..n {
            for j in (i + 1)..n {
                if rng.gen_bool(density) {
                    matrix.set_edge_idx(i, j, true);
                }
            }
        }
        Ok(matrix)
    }

    /// Generates a matrix over the vertices `"0".."n-1"` with exactly
    /// `round(n*(n-1)/2 * density)` distinct edges, sampled uniformly.
    pub fn generate_with_density_exact(n: usize, density: f64) -> Result<Self, ProcessingError> {
        check_density(density)?;
        let mut matrix = Self::with_vertices((0..n).map(|i| i.to_string()).collect())?;
        let max_edges = n * n.saturating_sub(1) / 2;
        let amount = (max_edges as f64 * density).round() as usize;
        // Pair ids enumerate the lower triangle row by row: id = i*(i-1)/2 + j with j < i.
        for id in sample(&mut thread_rng(), max_edges, amount.min(max_edges)) {
            let mut i = 1;
            while (i + 1) * i / 2 <= id {
                i += 1;
            }
            let j = id - i * (i - 1) / 2;
            matrix.set_edge_idx(i, j, true);
        }
        Ok(matrix)
    }

    /// Reads a matrix from its interchange form. Rows define the vertex set, missing entries are
    /// treated as `false`.
    ///
    /// The vertex order of the result is the lexicographic order of the row ids, not the order
    /// of the matrix `raw` was made from. Numeric ids such as the ones of `generate_random` are
    /// reordered (`"0", "1", "10", "11", "2", ...`), which changes the candidate order of the
    /// exact search and with it which cover is found first.
    pub fn from_raw(raw: &RawAdjacencyMatrix) -> Result<Self, ImportError> {
        let mut matrix = Self::with_vertices(raw.keys().cloned().collect())
            .map_err(|e| ImportError::InputMalformedError(e.to_string()))?;
        for (row, columns) in raw {
            let r = matrix.index_of(row).expect("rows define the vertex set");
            for (column, connected) in columns {
                let c = matrix.index_of(column).ok_or_else(|| {
                    ImportError::InputMalformedError(format!("column `{}` has no row", column))
                })?;
                if !connected {
                    continue
                }
                if r == c {
                    return Err(ImportError::InputMalformedError(format!("self loop at `{}`", row)))
                }
                let mirrored = raw[column].get(row).copied().unwrap_or(false);
                if !mirrored {
                    return Err(ImportError::InputMalformedError(format!("edge `{}` is not symmetric", Edge::new(row.clone(), column.clone()))))
                }
                matrix.set_edge_idx(r, c, true);
            }
        }
        Ok(matrix)
    }

    /// Parses a matrix from its JSON interchange form.
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        let raw: RawAdjacencyMatrix = serde_json::from_str(json)?;
        Self::from_raw(&raw)
    }

    /// Returns the interchange form, with every row/column pair present.
    pub fn to_raw(&self) -> RawAdjacencyMatrix {
        self.vertices
            .iter()
            .enumerate()
            .map(|(r, row)| {
                let columns = self.vertices
                    .iter()
                    .enumerate()
                    .map(|(c, column)| (column.clone(), self.has_edge_idx(r, c)))
                    .collect();
                (row.clone(), columns)
            })
            .collect()
    }
}

fn check_density(density: f64) -> Result<(), ProcessingError> {
    if !(0.0..=1.0).contains(&density) {
        return Err(ProcessingError::InvalidParameter(format!("density {} is not in [0, 1]", density)))
    }
    Ok(())
}

// Static functions
impl AdjacencyMatrix {

    /// Returns the number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns all vertex ids in matrix order.
    pub fn vertices(&self) -> &[String] {
        &self.vertices
    }

    pub(crate) fn vertex(&self, idx: usize) -> &str {
        &self.vertices[idx]
    }

    pub(crate) fn index_of(&self, vertex: &str) -> Option<usize> {
        self.index.get(vertex).copied()
    }

    fn edge_indices_of(&self, edge: &Edge) -> Result<(usize, usize), ProcessingError> {
        let a = self.index_of(&edge.vertex_a).ok_or_else(|| ProcessingError::UnknownVertex(edge.vertex_a.clone()))?;
        let b = self.index_of(&edge.vertex_b).ok_or_else(|| ProcessingError::UnknownVertex(edge.vertex_b.clone()))?;
        Ok((a, b))
    }

    pub(crate) fn has_edge_idx(&self, a: usize, b: usize) -> bool {
        self.adj[a * self.len() + b]
    }

    /// Returns the neighbors of the vertex at `idx` in matrix order.
    pub(crate) fn neighbors_idx(&self, idx: usize) -> impl Iterator<Item=usize> + '_ {
        let n = self.len();
        self.adj[idx * n..(idx + 1) * n]
            .iter()
            .enumerate()
            .filter_map(|(c, connected)| if *connected { Some(c) } else { None })
    }

    pub(crate) fn degree_idx(&self, idx: usize) -> usize {
        self.neighbors_idx(idx).count()
    }

    /// Returns an iterator over all edges as index pairs `(a, b)` with `a < b`, row by row.
    pub(crate) fn edge_indices(&self) -> impl Iterator<Item=(usize, usize)> + '_ {
        (0..self.len()).flat_map(move |a| {
            self.neighbors_idx(a).filter(move |b| a < *b).map(move |b| (a, b))
        })
    }

    /// Checks if `edge` exists. Edges with unknown endpoints never exist.
    pub fn has_edge(&self, edge: &Edge) -> bool {
        match self.edge_indices_of(edge) {
            Ok((a, b)) => self.has_edge_idx(a, b),
            Err(_) => false,
        }
    }

    /// Returns the degree of `vertex`, or `None` if it is unknown.
    pub fn degree(&self, vertex: &str) -> Option<usize> {
        self.index_of(vertex).map(|idx| self.degree_idx(idx))
    }

    /// Returns the degree of every vertex in matrix order.
    pub fn degrees(&self) -> Vec<VertexDegree> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, vertex)| VertexDegree { vertex: vertex.clone(), degree: self.degree_idx(i) })
            .collect()
    }

    /// Returns the degree of every vertex, sorted ascending. Ties keep the matrix order.
    pub fn degrees_sorted(&self) -> Vec<VertexDegree> {
        let mut degrees = self.degrees();
        degrees.sort_by_key(|vd| vd.degree);
        degrees
    }

    pub fn degrees_map(&self) -> FxHashMap<String, usize> {
        self.degrees().into_iter().map(|vd| (vd.vertex, vd.degree)).collect()
    }

    /// Returns the neighbors of `vertex` in matrix order, or `None` if it is unknown.
    pub fn neighbors(&self, vertex: &str) -> Option<Vec<String>> {
        self.index_of(vertex)
            .map(|idx| self.neighbors_idx(idx).map(|n| self.vertices[n].clone()).collect())
    }

    /// Returns an iterator over all edges. `vertex_a` is always the endpoint that comes first in
    /// matrix order.
    pub fn edges(&self) -> impl Iterator<Item=Edge> + '_ {
        self.edge_indices().map(move |(a, b)| Edge::new(self.vertices[a].clone(), self.vertices[b].clone()))
    }

    pub fn edge_count(&self) -> usize {
        self.edge_indices().count()
    }

    pub fn for_each_edge<F: FnMut(&str, &str)>(&self, mut f: F) {
        for (a, b) in self.edge_indices() {
            f(&self.vertices[a], &self.vertices[b]);
        }
    }

    /// Calls `f(vertex, neighbor)` for every edge incident to `vertex`.
    pub fn for_each_edge_of_vertex<F: FnMut(&str, &str)>(&self, vertex: &str, mut f: F) {
        if let Some(idx) = self.index_of(vertex) {
            for neigh in self.neighbors_idx(idx) {
                f(&self.vertices[idx], &self.vertices[neigh]);
            }
        }
    }

    pub fn map_edges<T, F: FnMut(&str, &str) -> T>(&self, mut f: F) -> Vec<T> {
        self.edge_indices()
            .map(|(a, b)| f(&self.vertices[a], &self.vertices[b]))
            .collect()
    }

    /// Checks `pred` on every edge, stopping at the first edge that fails it.
    pub fn all_edges<F: FnMut(&str, &str) -> bool>(&self, mut pred: F) -> bool {
        self.edge_indices().all(|(a, b)| pred(&self.vertices[a], &self.vertices[b]))
    }

    /// Checks if `cover` covers every edge.
    pub fn validate_cover(&self, cover: &Cover) -> bool {
        self.all_edges(|a, b| cover.contains(a) || cover.contains(b))
    }
}

// Dynamic functions
impl AdjacencyMatrix {

    pub(crate) fn set_edge_idx(&mut self, a: usize, b: usize, connected: bool) {
        let n = self.len();
        self.adj[a * n + b] = connected;
        self.adj[b * n + a] = connected;
    }

    /// Adds `edge` on both sides.
    pub fn add_edge(&mut self, edge: &Edge) -> Result<(), ProcessingError> {
        let (a, b) = self.edge_indices_of(edge)?;
        if a == b {
            return Err(ProcessingError::InvalidEdge(edge.key()))
        }
        self.set_edge_idx(a, b, true);
        Ok(())
    }

    /// Removes `edge` on both sides.
    pub fn remove_edge(&mut self, edge: &Edge) -> Result<(), ProcessingError> {
        let (a, b) = self.edge_indices_of(edge)?;
        self.set_edge_idx(a, b, false);
        Ok(())
    }
}
