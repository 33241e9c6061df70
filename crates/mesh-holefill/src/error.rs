//! Error types for hole-filling operations.

use thiserror::Error;

/// Result type alias for hole-filling operations.
pub type FillResult<T> = Result<T, FillError>;

/// Errors that can occur while filling a hole.
#[derive(Debug, Error)]
pub enum FillError {
    /// The advancing front got stuck: no rule's precondition succeeded
    /// for any queued corner.
    #[error("no advancing-front rule applicable (front length {front_len}, {queued} corners queued)")]
    NoRuleApplicable { front_len: usize, queued: usize },

    /// A vertex expected to be present in the front or filling is absent.
    #[error("vertex {index} not found in {context}")]
    VertexNotFound { index: u32, context: &'static str },

    /// The input boundary loop has fewer than 3 distinct vertices.
    #[error("hole boundary is degenerate: {details}")]
    DegenerateLoop { details: String },

    /// The front or its corner list reached an inconsistent state.
    #[error("invalid front topology: {details}")]
    InvalidTopology { details: String },
}
