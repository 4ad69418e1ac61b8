use serde::{Deserialize, Serialize};

use storefront_core::{Entity, FavoriteId, ProductId, UserId};

/// A user's interest in a product.
///
/// Pairs are unique in practice only; nothing here prevents a user from
/// favoriting the same product twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Favorite {
    id: FavoriteId,
    user: UserId,
    product: ProductId,
}

impl Favorite {
    pub fn new(id: FavoriteId, user: UserId, product: ProductId) -> Self {
        Self { id, user, product }
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn product(&self) -> ProductId {
        self.product
    }

    pub fn is_pair(&self, user: UserId, product: ProductId) -> bool {
        self.user == user && self.product == product
    }
}

impl Entity for Favorite {
    type Id = FavoriteId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for Favorite {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} - {}", self.user, self.product)
    }
}
