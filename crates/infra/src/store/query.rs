//! Listing parameters shared by every catalog store.
//!
//! Listings are always paginated; callers cannot ask for an unbounded scan.

use serde::{Deserialize, Serialize};

use storefront_core::ShopId;
use storefront_products::{ProductKind, ProductState};

/// Pagination parameters for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of records to return.
    pub limit: usize,
    /// Number of records to skip (0-based).
    pub offset: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Pagination for a 1-based page number. Page 0 is read as page 1.
    pub fn page(page: usize, limit: usize) -> Self {
        Self {
            limit,
            offset: page.max(1).saturating_sub(1).saturating_mul(limit),
        }
    }
}

/// Filter criteria for product listings. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub shop: Option<ShopId>,
    pub state: Option<ProductState>,
    pub kind: Option<ProductKind>,
}

impl ProductFilter {
    pub fn shop_in_state(shop: ShopId, state: ProductState) -> Self {
        Self {
            shop: Some(shop),
            state: Some(state),
            kind: None,
        }
    }
}

/// Ordering of a product listing. Ties always fall back to the product id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    /// Most recently created first.
    #[default]
    Newest,
    Oldest,
    /// Most recently modified first.
    RecentlyUpdated,
    PriceAsc,
    PriceDesc,
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of records matching the filter across all pages.
    pub total: u64,
    pub pagination: Pagination,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        let seen = pagination.offset.saturating_add(items.len()) as u64;
        Self {
            has_more: seen < total,
            items,
            total,
            pagination,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            pagination: self.pagination,
            has_more: self.has_more,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_numbers_are_one_based() {
        assert_eq!(Pagination::page(1, 20), Pagination::new(20, 0));
        assert_eq!(Pagination::page(3, 20), Pagination::new(20, 40));
        assert_eq!(Pagination::page(0, 20), Pagination::new(20, 0));
    }

    #[test]
    fn has_more_reflects_remaining_records() {
        let page = Page::new(vec![1, 2], 5, Pagination::new(2, 2));
        assert!(page.has_more);
        let last = Page::new(vec![5], 5, Pagination::new(2, 4));
        assert!(!last.has_more);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: consecutive pages never overlap and leave no gaps.
            #[test]
            fn pages_tile_the_listing(page in 1usize..500, limit in 1usize..1000) {
                let this = Pagination::page(page, limit);
                let next = Pagination::page(page + 1, limit);
                prop_assert_eq!(this.offset + limit, next.offset);
            }

            /// Property: a page never claims more records than the total.
            #[test]
            fn has_more_only_when_records_remain(total in 0u64..200, offset in 0usize..200, limit in 0usize..50) {
                let shown = (total as usize).saturating_sub(offset).min(limit);
                let page = Page::new(vec![(); shown], total, Pagination::new(limit, offset));
                prop_assert_eq!(page.has_more, ((offset + shown) as u64) < total);
            }
        }
    }
}
