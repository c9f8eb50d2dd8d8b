//! Unified error handling for the storefront client.
//!
//! The taxonomy is deliberately small. Remote failures never appear here:
//! they are absorbed at the fallback boundary and logged, so the only errors
//! that reach callers are ones a user can act on.

use thiserror::Error;

use crate::storage::StorageError;

/// Client-level error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Operation attempted without an authenticated session. Callers should
    /// route the user to a login flow rather than treat this as fatal.
    #[error("authentication required")]
    AuthRequired,

    /// Invalid input, surfaced to the user as-is. Raised before anything is
    /// persisted.
    #[error("{0}")]
    Validation(String),

    /// Entity unknown to both the remote API and the local catalog.
    #[error("not found: {0}")]
    NotFound(String),

    /// Local persistence failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// Convenience constructor for validation failures.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;
