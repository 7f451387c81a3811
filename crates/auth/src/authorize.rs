use thiserror::Error;

use crate::{Caller, Permission};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Check that `caller` holds `required` (or the wildcard).
///
/// Pure policy check: no IO, no panics.
pub fn authorize(caller: &Caller, required: &Permission) -> Result<(), AuthzError> {
    let granted = caller
        .permissions()
        .iter()
        .any(|p| p.is_wildcard() || p == required);

    if granted {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}
