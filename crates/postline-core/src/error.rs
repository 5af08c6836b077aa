//! Domain-level error types.

use thiserror::Error;

use crate::domain::KeyError;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A comment was built against a post key that does not decode.
    #[error("Invalid post reference: {0}")]
    InvalidReference(#[from] KeyError),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error(transparent)]
    Timeline(#[from] TimelineError),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Write failed: {0}")]
    Write(String),

    #[error("Record decoding failed: {0}")]
    Decode(String),
}

/// Errors surfaced by a merge-fetch.
#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("Store error: {0}")]
    Store(#[from] RepoError),

    #[error("Store call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Sub-fetch task failed: {0}")]
    Join(String),
}
