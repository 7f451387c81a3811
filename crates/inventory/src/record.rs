use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{InventoryId, ProductId, ShopId};

/// Location recorded when the seller has not specified a warehouse.
pub const DEFAULT_LOCATION: &str = "unknown";

/// Stock held back for a pending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub order_ref: String,
    pub quantity: u64,
    pub reserved_at: DateTime<Utc>,
}

/// Stock-tracking record paired with one catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: InventoryId,
    pub product: ProductId,
    pub shop: ShopId,
    pub stock: u64,
    pub location: String,
    pub reservations: Vec<Reservation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    /// Opening record for a freshly created product: stock is the product quantity.
    pub fn opening(product: ProductId, shop: ShopId, quantity: u64, now: DateTime<Utc>) -> Self {
        Self {
            id: InventoryId::new(),
            product,
            shop,
            stock: quantity,
            location: DEFAULT_LOCATION.to_string(),
            reservations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> ShopId {
        ShopId::new("shop1").unwrap()
    }

    #[test]
    fn opening_record_copies_quantity() {
        let product = ProductId::new();
        let record = InventoryRecord::opening(product, shop(), 10, Utc::now());
        assert_eq!(record.product, product);
        assert_eq!(record.stock, 10);
        assert_eq!(record.location, DEFAULT_LOCATION);
        assert!(record.reservations.is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: opening stock equals the product quantity exactly.
            #[test]
            fn opening_stock_is_exact(quantity in any::<u64>()) {
                let record = InventoryRecord::opening(ProductId::new(), shop(), quantity, Utc::now());
                prop_assert_eq!(record.stock, quantity);
            }
        }
    }
}
