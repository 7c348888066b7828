//! Error types for mechanism analysis

use thiserror::Error;

/// Main error type for frame capacity analysis
#[derive(Error, Debug)]
pub enum SlamaError {
    #[error("Node {0} not found in frame")]
    NodeNotFound(usize),

    #[error("Floor {0} not found in frame")]
    FloorNotFound(usize),

    #[error("Span {0} not found in frame")]
    SpanNotFound(usize),

    #[error("Section tag {0} not found in collection")]
    SectionNotFound(usize),

    #[error("Invalid frame definition: {0}")]
    InvalidFrame(String),

    #[error("Invalid section '{id}': {reason}")]
    InvalidSection { id: String, reason: String },

    #[error("Beams framing into internal node {node} have different depths")]
    MismatchedBeamDepths { node: usize },

    #[error("No candidate produced a finite capacity at node {node}")]
    UnresolvedHierarchy { node: usize },

    #[error("Capacity and demand curves do not intersect at node {node} for candidate {candidate}")]
    NoIntersection { node: usize, candidate: &'static str },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for frame capacity analysis
pub type SlamaResult<T> = Result<T, SlamaError>;
