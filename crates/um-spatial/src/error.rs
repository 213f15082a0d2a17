//! Spatial-subsystem error type.

use thiserror::Error;

/// Errors produced by `um-spatial` while building or querying a graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpatialError {
    /// A node with this key was already added; the first one is kept.
    #[error("duplicate node key {0:?}")]
    DuplicateNode(String),

    #[error("node {0:?} not found in graph")]
    UnknownNode(String),

    /// The node already carries a traffic signal.
    #[error("node {0:?} already has a signal")]
    DuplicateSignal(String),

    #[error("invalid edge {key:?}: {reason}")]
    InvalidEdge { key: String, reason: String },
}

pub type SpatialResult<T> = Result<T, SpatialError>;
