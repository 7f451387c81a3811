use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use storefront_core::{AttributeId, ProductId, ShopId};
use storefront_inventory::InventoryRecord;
use storefront_products::{AttributeRecord, CatalogRecord, FieldPatch, ProductPatch, ProductState};

use super::query::{Page, Pagination, ProductFilter, ProductSort};
use super::{CatalogStore, CatalogTx, StoreError};

/// Store operation that can be made to misbehave in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    Begin,
    InsertAttributes,
    InsertProduct,
    InsertInventory,
    Commit,
    PatchAttributes,
    PatchProduct,
    Transition,
    Read,
    List,
    Search,
}

/// Injected misbehaviour. Stays armed until cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    Fail(StoreError),
    Delay(Duration),
}

#[derive(Debug, Default)]
struct Tables {
    /// collection -> attribute documents
    attributes: HashMap<String, HashMap<AttributeId, AttributeRecord>>,
    products: HashMap<ProductId, CatalogRecord>,
    /// keyed by product: at most one inventory record each
    inventory: HashMap<ProductId, InventoryRecord>,
}

#[derive(Debug, Default)]
struct Shared {
    tables: RwLock<Tables>,
    faults: Mutex<HashMap<FailPoint, Fault>>,
}

impl Shared {
    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn armed(&self, point: FailPoint) -> Result<Option<Fault>, StoreError> {
        let faults = self
            .faults
            .lock()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(faults.get(&point).cloned())
    }

    async fn trip(&self, point: FailPoint) -> Result<(), StoreError> {
        match self.armed(point)? {
            None => Ok(()),
            Some(Fault::Fail(err)) => Err(err),
            Some(Fault::Delay(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}

/// In-memory catalog store.
///
/// Intended for tests/dev. Cloning yields another handle onto the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogStore {
    shared: Arc<Shared>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a fault on `point`, replacing any fault already armed there.
    pub fn inject(&self, point: FailPoint, fault: Fault) {
        if let Ok(mut faults) = self.shared.faults.lock() {
            faults.insert(point, fault);
        }
    }

    pub fn clear_fault(&self, point: FailPoint) {
        if let Ok(mut faults) = self.shared.faults.lock() {
            faults.remove(&point);
        }
    }

    pub fn clear_faults(&self) {
        if let Ok(mut faults) = self.shared.faults.lock() {
            faults.clear();
        }
    }

    pub fn product_count(&self) -> usize {
        self.shared.read().map(|t| t.products.len()).unwrap_or(0)
    }

    pub fn attribute_count(&self, collection: &str) -> usize {
        self.shared
            .read()
            .map(|t| t.attributes.get(collection).map_or(0, HashMap::len))
            .unwrap_or(0)
    }

    pub fn inventory_count(&self) -> usize {
        self.shared.read().map(|t| t.inventory.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn begin(&self) -> Result<Box<dyn CatalogTx>, StoreError> {
        self.shared.trip(FailPoint::Begin).await?;
        Ok(Box::new(InMemoryTx {
            shared: Arc::clone(&self.shared),
            attributes: Vec::new(),
            products: Vec::new(),
            inventory: Vec::new(),
        }))
    }

    async fn product(&self, id: ProductId) -> Result<Option<CatalogRecord>, StoreError> {
        self.shared.trip(FailPoint::Read).await?;
        Ok(self.shared.read()?.products.get(&id).cloned())
    }

    async fn attributes(
        &self,
        collection: &str,
        id: AttributeId,
    ) -> Result<Option<AttributeRecord>, StoreError> {
        self.shared.trip(FailPoint::Read).await?;
        let tables = self.shared.read()?;
        Ok(tables
            .attributes
            .get(collection)
            .and_then(|docs| docs.get(&id))
            .cloned())
    }

    async fn inventory(&self, product: ProductId) -> Result<Option<InventoryRecord>, StoreError> {
        self.shared.trip(FailPoint::Read).await?;
        Ok(self.shared.read()?.inventory.get(&product).cloned())
    }

    async fn patch_attributes(
        &self,
        collection: &str,
        id: AttributeId,
        patch: &FieldPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<AttributeRecord>, StoreError> {
        self.shared.trip(FailPoint::PatchAttributes).await?;
        let mut tables = self.shared.write()?;
        let Some(record) = tables
            .attributes
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(&id))
        else {
            return Ok(None);
        };
        patch
            .apply_to(&mut record.fields)
            .map_err(|e| StoreError::InvalidDocument(e.to_string()))?;
        record.updated_at = now;
        Ok(Some(record.clone()))
    }

    async fn patch_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<CatalogRecord>, StoreError> {
        self.shared.trip(FailPoint::PatchProduct).await?;
        let mut tables = self.shared.write()?;
        Ok(tables.products.get_mut(&id).map(|record| {
            record.apply_patch(patch, now);
            record.clone()
        }))
    }

    async fn transition(
        &self,
        shop: &ShopId,
        id: ProductId,
        target: ProductState,
        now: DateTime<Utc>,
    ) -> Result<Option<CatalogRecord>, StoreError> {
        self.shared.trip(FailPoint::Transition).await?;
        let mut tables = self.shared.write()?;
        let Some(record) = tables.products.get_mut(&id).filter(|r| &r.shop == shop) else {
            return Ok(None);
        };
        let moved = match target {
            ProductState::Published => record.publish(now),
            ProductState::Draft => record.unpublish(now),
        };
        Ok(moved.ok().map(|()| record.clone()))
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        pagination: Pagination,
    ) -> Result<Page<CatalogRecord>, StoreError> {
        self.shared.trip(FailPoint::List).await?;
        let tables = self.shared.read()?;
        let mut matching: Vec<&CatalogRecord> = tables
            .products
            .values()
            .filter(|r| matches_filter(r, filter))
            .collect();
        matching.sort_by(|a, b| compare(sort, a, b));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(pagination.offset)
            .take(pagination.limit)
            .cloned()
            .collect();
        Ok(Page::new(items, total, pagination))
    }

    async fn search_products(&self, keyword: &str) -> Result<Vec<CatalogRecord>, StoreError> {
        self.shared.trip(FailPoint::Search).await?;
        let terms = tokenize(keyword);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let tables = self.shared.read()?;
        let mut hits: Vec<(u32, &CatalogRecord)> = tables
            .products
            .values()
            .filter_map(|r| {
                let score = relevance(&terms, r);
                (score > 0).then_some((score, r))
            })
            .collect();
        hits.sort_by(|(sa, a), (sb, b)| {
            sb.cmp(sa)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(hits.into_iter().map(|(_, r)| r.clone()).collect())
    }
}

/// Staged writes of one in-memory transaction.
struct InMemoryTx {
    shared: Arc<Shared>,
    attributes: Vec<(String, AttributeRecord)>,
    products: Vec<CatalogRecord>,
    inventory: Vec<InventoryRecord>,
}

impl InMemoryTx {
    fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.products.is_empty() && self.inventory.is_empty()
    }

    /// Check every staged write against `tables`, without applying anything.
    fn check(&self, tables: &Tables) -> Result<(), StoreError> {
        let staged_attributes: HashSet<AttributeId> =
            self.attributes.iter().map(|(_, r)| r.id).collect();
        let staged_products: HashSet<ProductId> = self.products.iter().map(|r| r.id).collect();

        for (collection, record) in &self.attributes {
            let taken = tables
                .attributes
                .get(collection)
                .is_some_and(|docs| docs.contains_key(&record.id));
            if taken {
                return Err(StoreError::Duplicate(format!("{collection}/{}", record.id)));
            }
        }
        for record in &self.products {
            if tables.products.contains_key(&record.id) {
                return Err(StoreError::Duplicate(format!("products/{}", record.id)));
            }
            let owned = staged_attributes.contains(&record.attributes_ref)
                || tables
                    .attributes
                    .values()
                    .any(|docs| docs.contains_key(&record.attributes_ref));
            if !owned {
                return Err(StoreError::Aborted(format!(
                    "product {} references missing attributes {}",
                    record.id, record.attributes_ref
                )));
            }
        }
        for record in &self.inventory {
            if tables.inventory.contains_key(&record.product) {
                return Err(StoreError::Duplicate(format!("inventory/{}", record.product)));
            }
            if !staged_products.contains(&record.product) && !tables.products.contains_key(&record.product) {
                return Err(StoreError::Aborted(format!(
                    "inventory references missing product {}",
                    record.product
                )));
            }
        }
        Ok(())
    }
}

impl Drop for InMemoryTx {
    fn drop(&mut self) {
        if !self.is_empty() {
            debug!(
                attributes = self.attributes.len(),
                products = self.products.len(),
                inventory = self.inventory.len(),
                "uncommitted transaction discarded"
            );
        }
    }
}

#[async_trait]
impl CatalogTx for InMemoryTx {
    async fn insert_attributes(
        &mut self,
        collection: &str,
        record: AttributeRecord,
    ) -> Result<(), StoreError> {
        self.shared.trip(FailPoint::InsertAttributes).await?;
        let staged = self
            .attributes
            .iter()
            .any(|(c, r)| c == collection && r.id == record.id);
        if staged {
            return Err(StoreError::Duplicate(format!("{collection}/{}", record.id)));
        }
        self.attributes.push((collection.to_string(), record));
        Ok(())
    }

    async fn insert_product(&mut self, record: CatalogRecord) -> Result<(), StoreError> {
        self.shared.trip(FailPoint::InsertProduct).await?;
        if self.products.iter().any(|r| r.id == record.id) {
            return Err(StoreError::Duplicate(format!("products/{}", record.id)));
        }
        self.products.push(record);
        Ok(())
    }

    async fn insert_inventory(&mut self, record: InventoryRecord) -> Result<(), StoreError> {
        self.shared.trip(FailPoint::InsertInventory).await?;
        if self.inventory.iter().any(|r| r.product == record.product) {
            return Err(StoreError::Duplicate(format!("inventory/{}", record.product)));
        }
        self.inventory.push(record);
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        self.shared.trip(FailPoint::Commit).await?;

        let shared = Arc::clone(&self.shared);
        let mut tables = shared.write()?;
        self.check(&tables)?;

        let (attribute_writes, product_writes) = (self.attributes.len(), self.products.len());
        for (collection, record) in self.attributes.drain(..) {
            tables
                .attributes
                .entry(collection)
                .or_default()
                .insert(record.id, record);
        }
        for record in self.products.drain(..) {
            tables.products.insert(record.id, record);
        }
        for record in self.inventory.drain(..) {
            tables.inventory.insert(record.product, record);
        }
        drop(tables);

        debug!(attributes = attribute_writes, products = product_writes, "transaction committed");
        Ok(())
    }
}

fn matches_filter(record: &CatalogRecord, filter: &ProductFilter) -> bool {
    filter.shop.as_ref().is_none_or(|shop| &record.shop == shop)
        && filter.state.is_none_or(|state| record.state == state)
        && filter.kind.as_ref().is_none_or(|kind| &record.kind == kind)
}

fn compare(sort: ProductSort, a: &CatalogRecord, b: &CatalogRecord) -> Ordering {
    match sort {
        ProductSort::Newest => b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)),
        ProductSort::Oldest => a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)),
        ProductSort::RecentlyUpdated => b.updated_at.cmp(&a.updated_at).then_with(|| b.id.cmp(&a.id)),
        ProductSort::PriceAsc => a.price.total_cmp(&b.price).then_with(|| a.id.cmp(&b.id)),
        ProductSort::PriceDesc => b.price.total_cmp(&a.price).then_with(|| a.id.cmp(&b.id)),
    }
}

/// Lowercased alphanumeric words of `text`, deduplicated.
pub(crate) fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Name hits weigh twice as much as description hits.
fn relevance(terms: &HashSet<String>, record: &CatalogRecord) -> u32 {
    let name = tokenize(&record.name);
    let description = record.description.as_deref().map(tokenize).unwrap_or_default();
    terms
        .iter()
        .map(|term| 2 * u32::from(name.contains(term)) + u32::from(description.contains(term)))
        .sum()
}
