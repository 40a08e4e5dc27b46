use common::ContextError;
use thiserror::Error;

/// Errors that can occur when interacting with the event store.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored record carries a type tag no event variant recognises.
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    /// The caller's context finished before the operation completed.
    #[error("Event store operation aborted: {0}")]
    Aborted(#[from] ContextError),
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;
