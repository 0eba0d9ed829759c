//! Spatial-subsystem error type.

use thiserror::Error;

use evac_core::{GeoPoint, NodeId};

/// Errors produced by `evac-spatial`.
///
/// Everything except [`SpatialError::NoPath`] and
/// [`SpatialError::NodeNotFound`] is a load-time graph error and means the
/// network must not be served.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no path from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("edge {from} -> {to} has invalid length {length_m} m (must be finite and non-negative)")]
    InvalidLength { from: NodeId, to: NodeId, length_m: f64 },

    #[error("node {node} has invalid coordinates {pos}")]
    InvalidCoordinate { node: NodeId, pos: GeoPoint },

    #[error("edge references unknown source node id {0}")]
    UnknownSourceNode(i64),

    #[error("source node id {0} appears more than once")]
    DuplicateSourceNode(i64),

    #[error("network parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpatialError {
    /// `true` for errors that make the graph itself unusable.
    pub fn is_graph_error(&self) -> bool {
        !matches!(self, SpatialError::NoPath { .. } | SpatialError::NodeNotFound(_))
    }
}

pub type SpatialResult<T> = Result<T, SpatialError>;
