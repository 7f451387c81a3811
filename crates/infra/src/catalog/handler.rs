//! Kind handlers: creation and update of products of one kind.
//!
//! ## Creation
//!
//! One unit of work, in this order:
//!
//! ```text
//! attribute document  ->  base record (id = attribute id)  ->  inventory  ->  commit
//! ```
//!
//! Any failure before the commit drops the unit of work, so nothing is persisted and the
//! caller sees the stage that failed. Cancelling the caller's future has the same effect.
//!
//! ## Update
//!
//! Attribute fields are written first, then base fields, as two separate writes. If the
//! base write fails after the attribute write went through, the caller gets
//! [`CatalogError::PartialWriteFailure`] naming both stages.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use storefront_core::{ProductId, ShopId};
use storefront_products::{CatalogRecord, NewProduct, ProductAttributes, ProductKind, ProductUpdate};

use super::attribute_store::AttributeStore;
use super::base::BaseCatalog;
use super::error::{CatalogError, CatalogResult, WriteStage};
use crate::store::bounded;

/// Creates and updates products of one registered kind.
#[async_trait]
pub trait ProductKindHandler: Send + Sync {
    /// Collection holding this handler's attribute documents.
    fn collection(&self) -> &'static str;

    /// Create a draft product of `kind` owned by `shop`.
    async fn create_product(
        &self,
        kind: &ProductKind,
        shop: &ShopId,
        product: NewProduct,
    ) -> CatalogResult<CatalogRecord>;

    /// Update a product of `kind` owned by `shop`.
    async fn update_product(
        &self,
        kind: &ProductKind,
        shop: &ShopId,
        id: ProductId,
        update: ProductUpdate,
    ) -> CatalogResult<CatalogRecord>;
}

/// Handler for any attribute schema `A`.
pub struct KindHandler<A> {
    attributes: AttributeStore<A>,
    base: Arc<BaseCatalog>,
}

impl<A: ProductAttributes> KindHandler<A> {
    pub fn new(base: Arc<BaseCatalog>) -> Self {
        Self {
            attributes: AttributeStore::new(Arc::clone(base.store()), base.timeout()),
            base,
        }
    }
}

#[async_trait]
impl<A: ProductAttributes> ProductKindHandler for KindHandler<A> {
    fn collection(&self) -> &'static str {
        A::COLLECTION
    }

    async fn create_product(
        &self,
        kind: &ProductKind,
        shop: &ShopId,
        product: NewProduct,
    ) -> CatalogResult<CatalogRecord> {
        let attributes = A::parse(product.attributes.clone())?;
        let now = Utc::now();

        let mut tx = bounded(self.base.timeout(), self.base.store().begin())
            .await
            .map_err(|e| CatalogError::write(WriteStage::Attributes, e))?;
        let attributes_ref = self
            .attributes
            .create(tx.as_mut(), kind, shop, &attributes, now)
            .await?;
        let record = self
            .base
            .create_product(tx.as_mut(), shop, kind, attributes_ref, &product, now)
            .await?;
        bounded(self.base.timeout(), tx.commit())
            .await
            .map_err(|e| CatalogError::CommitFailed(e.to_string()))?;

        info!(
            product = %record.id,
            shop = %shop,
            kind = %kind,
            collection = A::COLLECTION,
            "product created"
        );
        Ok(record)
    }

    async fn update_product(
        &self,
        kind: &ProductKind,
        shop: &ShopId,
        id: ProductId,
        update: ProductUpdate,
    ) -> CatalogResult<CatalogRecord> {
        let current = self.base.find_owned(shop, id).await?;
        if &current.kind != kind {
            return Err(CatalogError::InvalidKind(format!(
                "product {id} is {}, not {kind}",
                current.kind
            )));
        }

        // Both halves are validated before anything is written.
        let attribute_patch = match update.attributes {
            Some(raw) => Some(A::parse_patch(raw)?),
            None => None,
        };
        update.base.validate()?;

        let now = Utc::now();
        let mut wrote_attributes = false;
        if let Some(patch) = attribute_patch.filter(|p| !p.is_empty()) {
            self.attributes.update(current.attributes_ref, &patch, now).await?;
            wrote_attributes = true;
        }

        match self.base.update_product(id, &update.base, now).await {
            Ok(record) => {
                info!(product = %id, shop = %shop, kind = %kind, "product updated");
                Ok(record)
            }
            Err(err) if wrote_attributes => {
                warn!(product = %id, error = %err, "base write failed after attribute write");
                Err(CatalogError::PartialWriteFailure {
                    committed: WriteStage::Attributes,
                    failed: WriteStage::Base,
                    reason: err.to_string(),
                })
            }
            Err(err) => Err(err),
        }
    }
}
