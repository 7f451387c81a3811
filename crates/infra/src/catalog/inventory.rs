//! Inventory bookkeeping attached to catalog records.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use storefront_core::ProductId;
use storefront_inventory::InventoryRecord;
use storefront_products::CatalogRecord;

use super::error::{CatalogError, CatalogResult, WriteStage};
use crate::store::{CatalogStore, CatalogTx, bounded};

#[derive(Clone)]
pub struct InventoryCoordinator {
    store: Arc<dyn CatalogStore>,
    timeout: Duration,
}

impl InventoryCoordinator {
    pub fn new(store: Arc<dyn CatalogStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Stage the opening stock record for a freshly created product.
    ///
    /// Stock equals the product's quantity; the location is unknown until a seller sets it.
    pub async fn record_opening_stock(
        &self,
        tx: &mut dyn CatalogTx,
        product: &CatalogRecord,
        now: DateTime<Utc>,
    ) -> CatalogResult<InventoryRecord> {
        let record = InventoryRecord::opening(product.id, product.shop.clone(), product.quantity, now);
        bounded(self.timeout, tx.insert_inventory(record.clone()))
            .await
            .map_err(|e| CatalogError::write(WriteStage::Inventory, e))?;
        debug!(product = %product.id, stock = record.stock, "opening stock staged");
        Ok(record)
    }

    pub async fn stock_for(&self, product: ProductId) -> CatalogResult<InventoryRecord> {
        bounded(self.timeout, self.store.inventory(product))
            .await
            .map_err(CatalogError::query)?
            .ok_or(CatalogError::NotFound)
    }
}
