//! Document access error types.

use thiserror::Error;

/// Errors produced by write operations on a [`Document`](crate::Document).
///
/// Reads never error; they report absence through `Option`.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The path is not a valid JSON pointer (must be `""` or start with `/`).
    #[error("invalid pointer path '{0}'")]
    InvalidPointer(String),

    /// A write descended through an existing element that is not an object.
    #[error("cannot write through '{path}': intermediate element is not an object")]
    IntermediateNotObject { path: String },

    /// An append targeted an existing element that is not an array.
    #[error("cannot append at '{path}': existing element is not an array")]
    NotAnArray { path: String },

    /// A merge endpoint does not exist.
    #[error("field '{0}' does not exist")]
    Missing(String),

    /// Merge endpoints are not both arrays or both objects.
    #[error("cannot merge '{src}' into '{dst}': endpoints must both be arrays or both be objects")]
    MergeKindMismatch { src: String, dst: String },

    /// The ingress payload is not valid JSON.
    #[error("malformed event payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, DocumentError>;
