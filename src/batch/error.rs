//! Batch-normalizer error types.

use thiserror::Error;

/// Result type for batch normalization.
pub type BatchResult<T> = Result<T, BatchError>;

/// Errors that abort normalization of a batch response.
///
/// A single unparseable part is never an error: it is logged and skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// No `--b_<token>` boundary marker anywhere in the payload.
    #[error("malformed batch response: no multipart boundary found ({length} bytes)")]
    MalformedTransport {
        /// Length of the rejected payload.
        length: usize,
    },
}

impl BatchError {
    /// Check if this error points at the upstream integration rather than
    /// at the caller's input.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::MalformedTransport { .. })
    }
}
