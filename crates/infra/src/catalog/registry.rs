//! Product kind registry.
//!
//! Maps kind names to their handlers. Populated once at startup, then shared read-only.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use storefront_core::{ProductId, ShopId};
use storefront_products::{
    CatalogRecord, Clothing, Electronics, Furniture, NewProduct, ProductAttributes, ProductKind,
    ProductUpdate,
};

use super::base::BaseCatalog;
use super::error::{CatalogError, CatalogResult};
use super::handler::{KindHandler, ProductKindHandler};

#[derive(Clone, Default)]
pub struct ProductRegistry {
    handlers: HashMap<ProductKind, Arc<dyn ProductKindHandler>>,
}

impl ProductRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in Clothing, Electronics and Furniture kinds.
    pub fn with_default_kinds(base: &Arc<BaseCatalog>) -> CatalogResult<Self> {
        let mut registry = Self::new();
        registry.register_default_kinds(base)?;
        Ok(registry)
    }

    pub fn register_default_kinds(&mut self, base: &Arc<BaseCatalog>) -> CatalogResult<()> {
        self.register_kind::<Clothing>(base)?;
        self.register_kind::<Electronics>(base)?;
        self.register_kind::<Furniture>(base)
    }

    /// Register `handler` under `kind`. The last registration for a name wins.
    pub fn register(
        &mut self,
        kind: ProductKind,
        handler: Arc<dyn ProductKindHandler>,
    ) -> Option<Arc<dyn ProductKindHandler>> {
        let collection = handler.collection();
        let previous = self.handlers.insert(kind.clone(), handler);
        if previous.is_some() {
            warn!(kind = %kind, collection, "product kind registered twice; previous handler replaced");
        } else {
            debug!(kind = %kind, collection, "product kind registered");
        }
        previous
    }

    /// Register the generic handler for schema `A` under `A::KIND`.
    pub fn register_kind<A: ProductAttributes>(&mut self, base: &Arc<BaseCatalog>) -> CatalogResult<()> {
        let kind = ProductKind::new(A::KIND)?;
        self.register(kind, Arc::new(KindHandler::<A>::new(Arc::clone(base))));
        Ok(())
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.resolve(kind).is_ok()
    }

    /// Registered kind names, sorted.
    pub fn kinds(&self) -> Vec<&ProductKind> {
        let mut kinds: Vec<&ProductKind> = self.handlers.keys().collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn resolve(&self, kind: &str) -> CatalogResult<(&ProductKind, &Arc<dyn ProductKindHandler>)> {
        ProductKind::new(kind)
            .ok()
            .and_then(|name| self.handlers.get_key_value(&name))
            .ok_or_else(|| CatalogError::InvalidKind(kind.to_string()))
    }

    /// Create a product of `kind` for `shop` from a raw payload.
    ///
    /// A payload naming a shop must name the caller's shop.
    pub async fn create_product(
        &self,
        kind: &str,
        shop: &ShopId,
        payload: JsonValue,
    ) -> CatalogResult<CatalogRecord> {
        let (kind, handler) = self.resolve(kind)?;
        let product = NewProduct::from_json(payload)?;
        if let Some(claimed) = &product.shop {
            if claimed != shop {
                return Err(CatalogError::ValidationFailed(format!(
                    "payload shop '{claimed}' does not match caller shop '{shop}'"
                )));
            }
        }
        handler.create_product(kind, shop, product).await
    }

    /// Update a product of `kind` owned by `shop` from a raw partial payload.
    pub async fn update_product(
        &self,
        kind: &str,
        shop: &ShopId,
        id: ProductId,
        payload: JsonValue,
    ) -> CatalogResult<CatalogRecord> {
        let (kind, handler) = self.resolve(kind)?;
        let update = ProductUpdate::from_json(payload)?;
        handler.update_product(kind, shop, id, update).await
    }
}
