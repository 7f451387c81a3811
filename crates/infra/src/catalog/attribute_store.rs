use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use storefront_core::{AttributeId, ShopId};
use storefront_products::{AttributeRecord, FieldPatch, ProductAttributes, ProductKind};

use super::error::{CatalogError, CatalogResult, WriteStage};
use crate::store::{CatalogStore, CatalogTx, bounded};

/// Typed access to the attribute collection of schema `A`.
pub struct AttributeStore<A> {
    store: Arc<dyn CatalogStore>,
    timeout: Duration,
    _schema: PhantomData<fn() -> A>,
}

impl<A> Clone for AttributeStore<A> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            timeout: self.timeout,
            _schema: PhantomData,
        }
    }
}

impl<A: ProductAttributes> AttributeStore<A> {
    pub fn new(store: Arc<dyn CatalogStore>, timeout: Duration) -> Self {
        Self {
            store,
            timeout,
            _schema: PhantomData,
        }
    }

    pub fn collection(&self) -> &'static str {
        A::COLLECTION
    }

    /// Stage a new attribute document and return its fresh id.
    pub async fn create(
        &self,
        tx: &mut dyn CatalogTx,
        kind: &ProductKind,
        shop: &ShopId,
        attributes: &A,
        now: DateTime<Utc>,
    ) -> CatalogResult<AttributeId> {
        let record = AttributeRecord {
            id: AttributeId::new(),
            kind: kind.clone(),
            shop: shop.clone(),
            fields: attributes.to_document()?,
            updated_at: now,
        };
        let id = record.id;
        bounded(self.timeout, tx.insert_attributes(A::COLLECTION, record))
            .await
            .map_err(|e| CatalogError::write(WriteStage::Attributes, e))?;
        debug!(collection = A::COLLECTION, attributes = %id, "attribute document staged");
        Ok(id)
    }

    /// Set only the fields addressed by `patch`.
    pub async fn update(
        &self,
        id: AttributeId,
        patch: &FieldPatch,
        now: DateTime<Utc>,
    ) -> CatalogResult<AttributeRecord> {
        bounded(
            self.timeout,
            self.store.patch_attributes(A::COLLECTION, id, patch, now),
        )
        .await
        .map_err(|e| CatalogError::write(WriteStage::Attributes, e))?
        .ok_or(CatalogError::NotFound)
    }

    /// Load and decode one attribute document.
    pub async fn get(&self, id: AttributeId) -> CatalogResult<Option<A>> {
        let record = bounded(self.timeout, self.store.attributes(A::COLLECTION, id))
            .await
            .map_err(CatalogError::query)?;
        match record {
            Some(record) => Ok(Some(record.decode::<A>()?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use storefront_products::Electronics;

    use crate::store::InMemoryCatalogStore;

    fn electronics() -> (AttributeStore<Electronics>, InMemoryCatalogStore) {
        let store = InMemoryCatalogStore::new();
        let attributes = AttributeStore::new(Arc::new(store.clone()), Duration::from_secs(1));
        (attributes, store)
    }

    #[tokio::test]
    async fn staged_document_is_readable_after_commit_only() {
        let (attributes, store) = electronics();
        let kind = ProductKind::new("Electronics").unwrap();
        let shop = ShopId::new("shop-1").unwrap();
        let laptop = Electronics::parse(json!({ "manufacturer": "Acme", "model": "X1" })).unwrap();

        let mut tx = store.begin().await.unwrap();
        let id = attributes
            .create(tx.as_mut(), &kind, &shop, &laptop, Utc::now())
            .await
            .unwrap();
        assert_eq!(attributes.get(id).await.unwrap(), None);

        // Attribute-only transactions are legal at this layer.
        tx.commit().await.unwrap();
        assert_eq!(attributes.collection(), "electronics");
        let stored = attributes.get(id).await.unwrap().unwrap();
        assert_eq!(stored.manufacturer, "Acme");
        assert_eq!(stored.model.as_deref(), Some("X1"));
    }

    #[tokio::test]
    async fn updating_a_missing_document_is_not_found() {
        let (attributes, _store) = electronics();
        let patch = Electronics::parse_patch(json!({ "color": "black" })).unwrap();
        let err = attributes.update(AttributeId::new(), &patch, Utc::now()).await.unwrap_err();
        assert_eq!(err, CatalogError::NotFound);
    }
}
