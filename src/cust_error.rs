//! This module contains all custom errors used in this library.

use thiserror::Error;

/// Errors raised while reading a matrix from its interchange form.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Import: IoError")]
    IoError(#[from] std::io::Error),
    #[error("Import: Json is malformed: {0}")]
    JsonError(#[from] serde_json::Error),
    /// The raw matrix breaks symmetry, has a self loop or references a vertex that has no row.
    #[error("Import: Input is malformed: {0}")]
    InputMalformedError(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessingError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// An edge given at construction references a vertex that is not part of the matrix.
    #[error("Invalid edge {0}: references an unknown vertex")]
    InvalidEdge(String),
    #[error("Unknown vertex: {0}")]
    UnknownVertex(String),
    /// Kernelization proved that no cover of the requested size exists.
    #[error("Kernel bound exceeded: {uncovered} uncovered edges, bound is {bound}")]
    KernelBoundExceeded { uncovered: usize, bound: usize },
    #[error("Computation was cancelled")]
    Cancelled,
}
