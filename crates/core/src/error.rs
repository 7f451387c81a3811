//! Errors raised by catalog domain types before anything touches storage.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Rejection of a payload, identifier or lifecycle move.
///
/// Missing records are a storage outcome and are reported by the catalog service, not here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Payload or patch field out of bounds (empty name, negative price, wrong attribute shape).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A stored attribute document no longer matches its schema.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Publishing a published record or unpublishing a draft.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
