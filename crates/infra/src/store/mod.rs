//! Catalog persistence boundary.
//!
//! The catalog layers talk to storage only through [`CatalogStore`] and the unit of work
//! it hands out, [`CatalogTx`]. Nothing here assumes a particular engine; the in-memory
//! implementation backs tests and local development.
//!
//! ## Guarantees a store must provide
//!
//! - Writes staged on a [`CatalogTx`] become visible together on `commit`, or not at all.
//!   Dropping a transaction without committing discards it.
//! - `transition` is a single conditional write: it only changes a record owned by the
//!   given shop that is not already in the target state.
//! - `search_products` returns matches ranked by relevance, best first.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use storefront_core::{AttributeId, ProductId, ShopId};
use storefront_inventory::InventoryRecord;
use storefront_products::{AttributeRecord, CatalogRecord, FieldPatch, ProductPatch, ProductState};

pub mod in_memory;
pub mod query;

pub use in_memory::{FailPoint, Fault, InMemoryCatalogStore};
pub use query::{Page, Pagination, ProductFilter, ProductSort};

/// Storage-level failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record with the same key already exists (or is already staged).
    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// The backend could not be reached or refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The call did not finish within its deadline.
    #[error("storage call timed out after {0:?}")]
    Timeout(Duration),

    /// A stored or staged document is malformed.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// The transaction could not be applied.
    #[error("transaction aborted: {0}")]
    Aborted(String),
}

/// Run one storage call under a deadline.
///
/// The inner future is dropped on expiry, so an abandoned call never completes later.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}

/// Unit of work spanning attribute, base and inventory collections.
#[async_trait]
pub trait CatalogTx: Send {
    /// Stage a new attribute document in `collection`.
    async fn insert_attributes(
        &mut self,
        collection: &str,
        record: AttributeRecord,
    ) -> Result<(), StoreError>;

    /// Stage a new base catalog record.
    async fn insert_product(&mut self, record: CatalogRecord) -> Result<(), StoreError>;

    /// Stage the inventory record of a product.
    async fn insert_inventory(&mut self, record: InventoryRecord) -> Result<(), StoreError>;

    /// Apply every staged write atomically.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Open a new unit of work.
    async fn begin(&self) -> Result<Box<dyn CatalogTx>, StoreError>;

    async fn product(&self, id: ProductId) -> Result<Option<CatalogRecord>, StoreError>;

    async fn attributes(
        &self,
        collection: &str,
        id: AttributeId,
    ) -> Result<Option<AttributeRecord>, StoreError>;

    async fn inventory(&self, product: ProductId) -> Result<Option<InventoryRecord>, StoreError>;

    /// Set the addressed attribute fields. Returns `None` if no such document exists.
    async fn patch_attributes(
        &self,
        collection: &str,
        id: AttributeId,
        patch: &FieldPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<AttributeRecord>, StoreError>;

    /// Apply a base field patch. Returns `None` if no such record exists.
    async fn patch_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<CatalogRecord>, StoreError>;

    /// Move a record owned by `shop` into `target`.
    ///
    /// Returns `None` when no record matches (wrong shop, missing, or already there).
    async fn transition(
        &self,
        shop: &ShopId,
        id: ProductId,
        target: ProductState,
        now: DateTime<Utc>,
    ) -> Result<Option<CatalogRecord>, StoreError>;

    async fn list_products(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        pagination: Pagination,
    ) -> Result<Page<CatalogRecord>, StoreError>;

    /// Keyword search over name and description, best match first.
    async fn search_products(&self, keyword: &str) -> Result<Vec<CatalogRecord>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bounded_passes_through_fast_calls() {
        let value = bounded(Duration::from_millis(50), async { Ok::<_, StoreError>(7) }).await;
        assert_eq!(value, Ok(7));
    }

    #[tokio::test]
    async fn bounded_reports_timeout_for_slow_calls() {
        let limit = Duration::from_millis(5);
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, StoreError>(())
        };
        assert_eq!(bounded(limit, slow).await, Err(StoreError::Timeout(limit)));
    }
}
