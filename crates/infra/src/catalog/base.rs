//! Base catalog records: the fields every product has regardless of kind.
//!
//! Kind handlers delegate the shared part of creation and update here. Creating a
//! record always stages its opening inventory in the same unit of work.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use storefront_core::{AttributeId, ProductId, ShopId};
use storefront_products::{CatalogRecord, NewProduct, ProductKind, ProductPatch};

use super::error::{CatalogError, CatalogResult, WriteStage};
use super::inventory::InventoryCoordinator;
use crate::store::{CatalogStore, CatalogTx, bounded};

pub struct BaseCatalog {
    store: Arc<dyn CatalogStore>,
    inventory: InventoryCoordinator,
    timeout: Duration,
}

impl BaseCatalog {
    pub fn new(store: Arc<dyn CatalogStore>, timeout: Duration) -> Self {
        Self {
            inventory: InventoryCoordinator::new(Arc::clone(&store), timeout),
            store,
            timeout,
        }
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn inventory(&self) -> &InventoryCoordinator {
        &self.inventory
    }

    /// Stage the draft record owning `attributes_ref`, then its inventory.
    pub async fn create_product(
        &self,
        tx: &mut dyn CatalogTx,
        shop: &ShopId,
        kind: &ProductKind,
        attributes_ref: AttributeId,
        product: &NewProduct,
        now: DateTime<Utc>,
    ) -> CatalogResult<CatalogRecord> {
        let record = CatalogRecord::draft(shop.clone(), kind.clone(), attributes_ref, product, now);
        bounded(self.timeout, tx.insert_product(record.clone()))
            .await
            .map_err(|e| CatalogError::write(WriteStage::Base, e))?;
        self.inventory.record_opening_stock(tx, &record, now).await?;
        Ok(record)
    }

    /// Apply a base-field patch. An empty patch still refreshes `updated_at`.
    pub async fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
        now: DateTime<Utc>,
    ) -> CatalogResult<CatalogRecord> {
        bounded(self.timeout, self.store.patch_product(id, patch, now))
            .await
            .map_err(|e| CatalogError::write(WriteStage::Base, e))?
            .ok_or(CatalogError::NotFound)
    }

    pub async fn find(&self, id: ProductId) -> CatalogResult<Option<CatalogRecord>> {
        bounded(self.timeout, self.store.product(id))
            .await
            .map_err(CatalogError::query)
    }

    /// Load a record owned by `shop`. Records of other shops read as missing.
    pub async fn find_owned(&self, shop: &ShopId, id: ProductId) -> CatalogResult<CatalogRecord> {
        self.find(id)
            .await?
            .filter(|record| &record.shop == shop)
            .ok_or(CatalogError::NotFound)
    }
}
