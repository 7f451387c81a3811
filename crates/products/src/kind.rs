//! Product kind names.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use storefront_core::DomainError;

/// Name of a product kind (e.g. "Clothing").
///
/// Kinds are open-ended: any non-empty name may be registered at startup, so this is a
/// validated string rather than an enum. Comparison is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductKind(String);

impl ProductKind {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product kind cannot be empty"));
        }
        if name.trim() != name {
            return Err(DomainError::validation(
                "product kind cannot have surrounding whitespace",
            ));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProductKind {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductKind> for String {
    fn from(value: ProductKind) -> Self {
        value.0
    }
}

impl FromStr for ProductKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_case_sensitive() {
        let a = ProductKind::new("Clothing").unwrap();
        let b = ProductKind::new("clothing").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn kind_rejects_blank_and_padded_names() {
        assert!(ProductKind::new("").is_err());
        assert!(ProductKind::new("  ").is_err());
        assert!(ProductKind::new(" Clothing").is_err());
    }
}
