//! Draft/published lifecycle of a catalog record.

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult};

/// Lifecycle state of a catalog record.
///
/// A record is either a draft or published, never both; the two boolean flags exposed
/// to callers are derived from this single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductState {
    #[default]
    Draft,
    Published,
}

impl ProductState {
    pub fn is_draft(self) -> bool {
        self == ProductState::Draft
    }

    pub fn is_published(self) -> bool {
        self == ProductState::Published
    }

    /// Draft → Published.
    pub fn publish(self) -> DomainResult<Self> {
        match self {
            ProductState::Draft => Ok(ProductState::Published),
            ProductState::Published => Err(DomainError::conflict("product is already published")),
        }
    }

    /// Published → Draft.
    pub fn unpublish(self) -> DomainResult<Self> {
        match self {
            ProductState::Published => Ok(ProductState::Draft),
            ProductState::Draft => Err(DomainError::conflict("product is already a draft")),
        }
    }
}

/// Serde adapter writing a state as the `is_draft`/`is_published` flag pair.
///
/// Reading rejects a pair where both or neither flag is set.
pub mod flags {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::ProductState;

    #[derive(Serialize, Deserialize)]
    struct Flags {
        is_draft: bool,
        is_published: bool,
    }

    pub fn serialize<S: Serializer>(state: &ProductState, serializer: S) -> Result<S::Ok, S::Error> {
        Flags {
            is_draft: state.is_draft(),
            is_published: state.is_published(),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ProductState, D::Error> {
        let flags = Flags::deserialize(deserializer)?;
        match (flags.is_draft, flags.is_published) {
            (true, false) => Ok(ProductState::Draft),
            (false, true) => Ok(ProductState::Published),
            _ => Err(D::Error::custom("exactly one of is_draft and is_published must be set")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_records_start_as_drafts() {
        let state = ProductState::default();
        assert!(state.is_draft());
        assert!(!state.is_published());
    }

    #[test]
    fn publish_then_unpublish_round_trips() {
        let published = ProductState::Draft.publish().unwrap();
        assert!(published.is_published());
        assert!(!published.is_draft());

        let draft = published.unpublish().unwrap();
        assert_eq!(draft, ProductState::Draft);
    }

    #[test]
    fn transitions_from_the_wrong_state_conflict() {
        match ProductState::Published.publish().unwrap_err() {
            DomainError::Conflict(_) => {}
            _ => panic!("Expected Conflict error for double publish"),
        }
        match ProductState::Draft.unpublish().unwrap_err() {
            DomainError::Conflict(_) => {}
            _ => panic!("Expected Conflict error for unpublishing a draft"),
        }
    }
}
