//! Caller-facing catalog facade.
//!
//! Checks permissions, then delegates writes to the registry and reads to the query
//! layer. Public reads (search, browse, fetch_one) take no caller.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{instrument, warn};

use storefront_auth::{Caller, Permission, authorize};
use storefront_core::ProductId;
use storefront_inventory::InventoryRecord;
use storefront_products::{CatalogRecord, ProductAttributes, ProductKind};

use super::base::BaseCatalog;
use super::error::{CatalogError, CatalogResult};
use super::handler::ProductKindHandler;
use super::query::{BrowseQuery, CatalogQueries, ProductDetail, ProductSummary, SearchResults};
use super::registry::ProductRegistry;
use crate::config::CatalogConfig;
use crate::store::{CatalogStore, Page};

#[derive(Clone)]
pub struct CatalogService {
    registry: Arc<ProductRegistry>,
    queries: CatalogQueries,
}

impl CatalogService {
    pub fn builder(store: Arc<dyn CatalogStore>, config: CatalogConfig) -> CatalogServiceBuilder {
        CatalogServiceBuilder::new(store, config)
    }

    /// Service with the built-in kinds registered.
    pub fn with_default_kinds(
        store: Arc<dyn CatalogStore>,
        config: CatalogConfig,
    ) -> CatalogResult<Self> {
        Ok(Self::builder(store, config).default_kinds()?.build())
    }

    pub fn registry(&self) -> &ProductRegistry {
        &self.registry
    }

    pub fn queries(&self) -> &CatalogQueries {
        &self.queries
    }

    #[instrument(skip(self, caller, payload), fields(shop = %caller.shop()))]
    pub async fn create_product(
        &self,
        caller: &Caller,
        kind: &str,
        payload: JsonValue,
    ) -> CatalogResult<CatalogRecord> {
        guard(caller, &Permission::PRODUCTS_WRITE)?;
        self.registry.create_product(kind, caller.shop(), payload).await
    }

    #[instrument(skip(self, caller, id, payload), fields(shop = %caller.shop(), product = %id))]
    pub async fn update_product(
        &self,
        caller: &Caller,
        kind: &str,
        id: ProductId,
        payload: JsonValue,
    ) -> CatalogResult<CatalogRecord> {
        guard(caller, &Permission::PRODUCTS_WRITE)?;
        self.registry.update_product(kind, caller.shop(), id, payload).await
    }

    pub async fn publish(&self, caller: &Caller, id: ProductId) -> CatalogResult<CatalogRecord> {
        guard(caller, &Permission::PRODUCTS_WRITE)?;
        self.queries.publish(caller.shop(), id).await
    }

    pub async fn unpublish(&self, caller: &Caller, id: ProductId) -> CatalogResult<CatalogRecord> {
        guard(caller, &Permission::PRODUCTS_WRITE)?;
        self.queries.unpublish(caller.shop(), id).await
    }

    pub async fn list_drafts(
        &self,
        caller: &Caller,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> CatalogResult<Page<CatalogRecord>> {
        guard(caller, &Permission::PRODUCTS_READ)?;
        self.queries.list_drafts(caller.shop(), limit, offset).await
    }

    pub async fn list_published(
        &self,
        caller: &Caller,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> CatalogResult<Page<CatalogRecord>> {
        guard(caller, &Permission::PRODUCTS_READ)?;
        self.queries.list_published(caller.shop(), limit, offset).await
    }

    pub async fn inventory_for(&self, caller: &Caller, id: ProductId) -> CatalogResult<InventoryRecord> {
        guard(caller, &Permission::PRODUCTS_READ)?;
        self.queries.inventory_for(caller.shop(), id).await
    }

    pub async fn search(&self, keyword: &str) -> CatalogResult<SearchResults> {
        self.queries.search(keyword).await
    }

    pub async fn browse(&self, query: &BrowseQuery) -> CatalogResult<Page<ProductSummary>> {
        self.queries.browse(query).await
    }

    pub async fn fetch_one(&self, id: ProductId) -> CatalogResult<ProductDetail> {
        self.queries.fetch_one(id).await
    }
}

fn guard(caller: &Caller, required: &Permission) -> CatalogResult<()> {
    authorize(caller, required).map_err(|err| {
        warn!(shop = %caller.shop(), permission = required.as_str(), "catalog call refused");
        CatalogError::from(err)
    })
}

/// Startup wiring: register kinds, then freeze the registry into a service.
pub struct CatalogServiceBuilder {
    base: Arc<BaseCatalog>,
    registry: ProductRegistry,
    queries: CatalogQueries,
}

impl CatalogServiceBuilder {
    fn new(store: Arc<dyn CatalogStore>, config: CatalogConfig) -> Self {
        Self {
            base: Arc::new(BaseCatalog::new(Arc::clone(&store), config.store_timeout)),
            registry: ProductRegistry::new(),
            queries: CatalogQueries::new(store, config),
        }
    }

    /// Shared base catalog, for custom handlers.
    pub fn base(&self) -> &Arc<BaseCatalog> {
        &self.base
    }

    pub fn default_kinds(mut self) -> CatalogResult<Self> {
        self.registry.register_default_kinds(&self.base)?;
        Ok(self)
    }

    pub fn kind<A: ProductAttributes>(mut self) -> CatalogResult<Self> {
        self.registry.register_kind::<A>(&self.base)?;
        Ok(self)
    }

    pub fn handler(mut self, kind: ProductKind, handler: Arc<dyn ProductKindHandler>) -> Self {
        self.registry.register(kind, handler);
        self
    }

    pub fn build(self) -> CatalogService {
        CatalogService {
            registry: Arc::new(self.registry),
            queries: self.queries,
        }
    }
}
