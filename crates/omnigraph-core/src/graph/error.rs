//! Graph error types.

use thiserror::Error;

use crate::confidence::ConfidenceError;
use crate::ontology::NodeIdError;

/// Errors that can occur while assembling, importing or exporting a graph.
///
/// Every error is local to the one operation that raised it; the graph or
/// builder it was raised against is left unchanged.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Malformed canonical node id.
    #[error(transparent)]
    NodeId(#[from] NodeIdError),

    /// Edge type outside the vocabulary or without a base score.
    #[error(transparent)]
    Confidence(#[from] ConfidenceError),

    /// Edge endpoint has no node and the builder rejects dangling edges.
    #[error("Edge references unknown node: {id}")]
    MissingNode { id: String },

    /// Edge confidence outside [0, 1] in imported data.
    #[error("Invalid confidence {value} on edge {from} -> {to}")]
    InvalidConfidence { from: String, to: String, value: f64 },

    /// Structurally valid JSON that does not describe a graph.
    #[error("Malformed exchange data: {0}")]
    Schema(String),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
