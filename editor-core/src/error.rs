//! Error types for editor operations.

use thiserror::Error;

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors that can occur in editor operations.
///
/// None of these are fatal: callers log them and carry on with the
/// previous state.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Malformed layout description or property value.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Operation referenced an element id that is not in the store.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// An element with this id already exists in the store.
    #[error("Duplicate element id: {0}")]
    DuplicateId(String),

    /// An event bus subscriber failed while handling an event.
    #[error("Handler for [{event}] failed: {message}")]
    Handler {
        /// Name of the event being published.
        event: String,
        /// Failure description reported by the handler.
        message: String,
    },

    /// Another interaction (drag or resize) is already in progress.
    #[error("Editor busy: {0}")]
    Busy(String),

    /// Operation is not valid in the current state.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EditorError {
    /// Whether this error is a stale-reference miss that callers should
    /// log and ignore.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound(_))
    }
}
