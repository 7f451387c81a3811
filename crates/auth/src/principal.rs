use serde::{Deserialize, Serialize};

use storefront_core::ShopId;

use crate::Permission;

/// Verified caller of a catalog operation.
///
/// Produced by the authentication layer after the credential check; the shop is the
/// seller on whose behalf writes are made and by which listings are scoped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    shop: ShopId,
    permissions: Vec<Permission>,
}

impl Caller {
    pub fn new(shop: ShopId, permissions: Vec<Permission>) -> Self {
        Self { shop, permissions }
    }

    /// Caller holding every permission (internal tooling, tests).
    pub fn trusted(shop: ShopId) -> Self {
        Self::new(shop, vec![Permission::WILDCARD])
    }

    pub fn shop(&self) -> &ShopId {
        &self.shop
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }
}
