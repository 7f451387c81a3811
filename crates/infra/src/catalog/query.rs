//! Read side of the catalog plus the publish/unpublish transitions.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use storefront_core::{AttributeId, ProductId, ShopId};
use storefront_inventory::InventoryRecord;
use storefront_products::{CatalogRecord, ProductKind, ProductState};

use super::error::{CatalogError, CatalogResult};
use super::inventory::InventoryCoordinator;
use crate::config::CatalogConfig;
use crate::store::{CatalogStore, Page, Pagination, ProductFilter, ProductSort, bounded};

/// Browse projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub thumbnail: String,
}

impl From<CatalogRecord> for ProductSummary {
    fn from(record: CatalogRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            price: record.price,
            thumbnail: record.thumbnail,
        }
    }
}

/// Single-product view: the record without its version counter and variations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub id: ProductId,
    pub shop: ShopId,
    pub kind: ProductKind,
    pub name: String,
    pub slug: String,
    pub thumbnail: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: u64,
    pub attributes_ref: AttributeId,
    pub rating: f64,
    pub is_draft: bool,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CatalogRecord> for ProductDetail {
    fn from(record: CatalogRecord) -> Self {
        Self {
            is_draft: record.is_draft(),
            is_published: record.is_published(),
            id: record.id,
            shop: record.shop,
            kind: record.kind,
            name: record.name,
            slug: record.slug,
            thumbnail: record.thumbnail,
            description: record.description,
            price: record.price,
            quantity: record.quantity,
            attributes_ref: record.attributes_ref,
            rating: record.rating,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Browse filter. Defaults to published products of every shop and kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowseFilter {
    pub published_only: bool,
    pub shop: Option<ShopId>,
    pub kind: Option<ProductKind>,
}

impl Default for BrowseFilter {
    fn default() -> Self {
        Self {
            published_only: true,
            shop: None,
            kind: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowseQuery {
    pub limit: Option<usize>,
    /// 1-based page number.
    pub page: Option<usize>,
    pub sort: ProductSort,
    pub filter: BrowseFilter,
}

/// Ranked search hits, best first.
#[derive(Debug)]
pub struct SearchResults {
    hits: std::vec::IntoIter<CatalogRecord>,
}

impl Iterator for SearchResults {
    type Item = CatalogRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.hits.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.hits.size_hint()
    }
}

impl ExactSizeIterator for SearchResults {}

#[derive(Clone)]
pub struct CatalogQueries {
    store: Arc<dyn CatalogStore>,
    inventory: InventoryCoordinator,
    config: CatalogConfig,
}

impl CatalogQueries {
    pub fn new(store: Arc<dyn CatalogStore>, config: CatalogConfig) -> Self {
        Self {
            inventory: InventoryCoordinator::new(Arc::clone(&store), config.store_timeout),
            store,
            config,
        }
    }

    fn timeout(&self) -> Duration {
        self.config.store_timeout
    }

    /// Drafts of `shop`, most recently modified first.
    pub async fn list_drafts(
        &self,
        shop: &ShopId,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> CatalogResult<Page<CatalogRecord>> {
        self.list_in_state(shop, ProductState::Draft, limit, offset).await
    }

    /// Published products of `shop`, most recently modified first.
    pub async fn list_published(
        &self,
        shop: &ShopId,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> CatalogResult<Page<CatalogRecord>> {
        self.list_in_state(shop, ProductState::Published, limit, offset).await
    }

    async fn list_in_state(
        &self,
        shop: &ShopId,
        state: ProductState,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> CatalogResult<Page<CatalogRecord>> {
        let pagination = Pagination::new(self.config.page_size(limit), offset.unwrap_or(0));
        let filter = ProductFilter::shop_in_state(shop.clone(), state);
        bounded(
            self.timeout(),
            self.store.list_products(&filter, ProductSort::RecentlyUpdated, pagination),
        )
        .await
        .map_err(CatalogError::query)
    }

    pub async fn publish(&self, shop: &ShopId, id: ProductId) -> CatalogResult<CatalogRecord> {
        self.transition(shop, id, ProductState::Published).await
    }

    pub async fn unpublish(&self, shop: &ShopId, id: ProductId) -> CatalogResult<CatalogRecord> {
        self.transition(shop, id, ProductState::Draft).await
    }

    async fn transition(
        &self,
        shop: &ShopId,
        id: ProductId,
        target: ProductState,
    ) -> CatalogResult<CatalogRecord> {
        let record = bounded(
            self.timeout(),
            self.store.transition(shop, id, target, Utc::now()),
        )
        .await
        .map_err(|e| CatalogError::BaseWriteFailed(e.to_string()))?
        .ok_or(CatalogError::NotFound)?;
        info!(product = %id, shop = %shop, state = ?target, "product state changed");
        Ok(record)
    }

    /// Keyword search over every product, drafts included.
    pub async fn search(&self, keyword: &str) -> CatalogResult<SearchResults> {
        if keyword.trim().is_empty() {
            return Ok(SearchResults {
                hits: Vec::new().into_iter(),
            });
        }
        let hits = bounded(self.timeout(), self.store.search_products(keyword))
            .await
            .map_err(CatalogError::query)?;
        Ok(SearchResults {
            hits: hits.into_iter(),
        })
    }

    pub async fn browse(&self, query: &BrowseQuery) -> CatalogResult<Page<ProductSummary>> {
        let limit = self.config.page_size(query.limit);
        let pagination = Pagination::page(query.page.unwrap_or(1), limit);
        let filter = ProductFilter {
            shop: query.filter.shop.clone(),
            state: query.filter.published_only.then_some(ProductState::Published),
            kind: query.filter.kind.clone(),
        };
        let page = bounded(self.timeout(), self.store.list_products(&filter, query.sort, pagination))
            .await
            .map_err(CatalogError::query)?;
        Ok(page.map(ProductSummary::from))
    }

    pub async fn fetch_one(&self, id: ProductId) -> CatalogResult<ProductDetail> {
        bounded(self.timeout(), self.store.product(id))
            .await
            .map_err(CatalogError::query)?
            .map(ProductDetail::from)
            .ok_or(CatalogError::NotFound)
    }

    /// Inventory of a product owned by `shop`.
    pub async fn inventory_for(&self, shop: &ShopId, id: ProductId) -> CatalogResult<InventoryRecord> {
        let owned = bounded(self.timeout(), self.store.product(id))
            .await
            .map_err(CatalogError::query)?
            .is_some_and(|record| &record.shop == shop);
        if !owned {
            return Err(CatalogError::NotFound);
        }
        self.inventory.stock_for(id).await
    }
}
