use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_auth::AuthzError;
use storefront_core::DomainError;

use crate::store::StoreError;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Which of the three record stores a write targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteStage {
    Attributes,
    Base,
    Inventory,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriteStage::Attributes => "attributes",
            WriteStage::Base => "base record",
            WriteStage::Inventory => "inventory",
        })
    }
}

/// Failure of a catalog operation, as reported to callers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    /// The kind is not registered, or does not match the stored record.
    #[error("invalid product kind: {0}")]
    InvalidKind(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("attribute write failed: {0}")]
    AttributeWriteFailed(String),

    #[error("base record write failed: {0}")]
    BaseWriteFailed(String),

    #[error("inventory write failed: {0}")]
    InventoryWriteFailed(String),

    /// All creation writes were staged but could not be applied; nothing persisted.
    #[error("commit failed: {0}")]
    CommitFailed(String),

    #[error("not found")]
    NotFound,

    /// An update persisted `committed` but then failed on `failed`.
    #[error("partial write: {committed} committed, {failed} failed: {reason}")]
    PartialWriteFailure {
        committed: WriteStage,
        failed: WriteStage,
        reason: String,
    },

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A read could not be served.
    #[error("query failed: {0}")]
    QueryFailed(String),
}

impl CatalogError {
    /// Attribute a storage failure to the write stage it happened in.
    pub fn write(stage: WriteStage, err: StoreError) -> Self {
        let msg = err.to_string();
        match stage {
            WriteStage::Attributes => CatalogError::AttributeWriteFailed(msg),
            WriteStage::Base => CatalogError::BaseWriteFailed(msg),
            WriteStage::Inventory => CatalogError::InventoryWriteFailed(msg),
        }
    }

    pub fn query(err: StoreError) -> Self {
        CatalogError::QueryFailed(err.to_string())
    }

    /// Stage whose write failed, if this is a write failure.
    pub fn failed_stage(&self) -> Option<WriteStage> {
        match self {
            CatalogError::AttributeWriteFailed(_) => Some(WriteStage::Attributes),
            CatalogError::BaseWriteFailed(_) => Some(WriteStage::Base),
            CatalogError::InventoryWriteFailed(_) => Some(WriteStage::Inventory),
            CatalogError::PartialWriteFailure { failed, .. } => Some(*failed),
            _ => None,
        }
    }
}

impl From<DomainError> for CatalogError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg)
            | DomainError::InvariantViolation(msg)
            | DomainError::InvalidId(msg)
            | DomainError::Conflict(msg) => CatalogError::ValidationFailed(msg),
        }
    }
}

impl From<AuthzError> for CatalogError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Forbidden(permission) => {
                CatalogError::Forbidden(format!("missing permission '{permission}'"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn store_failures_map_to_their_stage() {
        let err = CatalogError::write(WriteStage::Inventory, StoreError::Timeout(Duration::from_millis(5)));
        assert!(matches!(err, CatalogError::InventoryWriteFailed(_)));
        assert_eq!(err.failed_stage(), Some(WriteStage::Inventory));
    }

    #[test]
    fn domain_errors_surface_as_validation_failures() {
        let err: CatalogError = DomainError::validation("price must be positive").into();
        assert_eq!(err, CatalogError::ValidationFailed("price must be positive".into()));
        let err: CatalogError = DomainError::conflict("product is already published").into();
        assert_eq!(err, CatalogError::ValidationFailed("product is already published".into()));
    }

    #[test]
    fn partial_failure_names_both_stages() {
        let err = CatalogError::PartialWriteFailure {
            committed: WriteStage::Attributes,
            failed: WriteStage::Base,
            reason: "storage unavailable".into(),
        };
        let text = err.to_string();
        assert!(text.contains("attributes committed"));
        assert!(text.contains("base record failed"));
    }
}
