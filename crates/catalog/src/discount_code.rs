//! Discount codes.
//!
//! A code takes a fixed amount off one product for orders of at least
//! `limit`, can be used `quantity` more times, and expires at `expiration`.
//! Codes without an expiration are never valid.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::error::ensure_text;
use storefront_core::{DiscountCodeId, DomainError, DomainResult, Entity, ProductId, UserId};

use crate::format::group_thousands;

pub const NAME_MAX_CHARS: usize = 50;

/// Input for issuing a discount code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDiscountCode {
    pub name: String,
    pub price: u64,
    pub product: ProductId,
    pub limit: u64,
    pub quantity: u32,
    pub expiration: Option<DateTime<Utc>>,
}

impl NewDiscountCode {
    /// Single-use code with no reduction, no minimum and no expiration set.
    pub fn new(name: impl Into<String>, product: ProductId) -> Self {
        Self {
            name: name.into(),
            price: 0,
            product,
            limit: 0,
            quantity: 1,
            expiration: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountCode {
    id: DiscountCodeId,
    name: String,
    price: u64,
    product: ProductId,
    limit: u64,
    quantity: u32,
    used_by: BTreeSet<UserId>,
    expiration: Option<DateTime<Utc>>,
}

impl DiscountCode {
    pub fn create(id: DiscountCodeId, new: NewDiscountCode) -> DomainResult<Self> {
        ensure_text("name", &new.name, NAME_MAX_CHARS)?;

        Ok(Self {
            id,
            name: new.name,
            price: new.price,
            product: new.product,
            limit: new.limit,
            quantity: new.quantity,
            used_by: BTreeSet::new(),
            expiration: new.expiration,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Amount taken off the order.
    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn product(&self) -> ProductId {
        self.product
    }

    /// Minimum order total the code applies to.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Remaining redemptions.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn used_by(&self) -> &BTreeSet<UserId> {
        &self.used_by
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration
    }

    pub fn has_been_used_by(&self, user: UserId) -> bool {
        self.used_by.contains(&user)
    }

    pub fn formatted_price(&self) -> String {
        group_thousands(self.price)
    }

    pub fn formatted_limit(&self) -> String {
        group_thousands(self.limit)
    }

    pub fn set_expiration(&mut self, expiration: Option<DateTime<Utc>>) {
        self.expiration = expiration;
    }

    pub fn restock(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    /// True iff an expiration is set and `now` has not passed it.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|expiration| now <= expiration)
    }

    /// Use the code once for `user` on an order totalling `order_total`.
    ///
    /// All checks run before anything changes, so a rejected redemption leaves
    /// the code untouched. On success one unit is consumed and the user is
    /// recorded.
    pub fn redeem(&mut self, user: UserId, order_total: u64, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.is_valid(now) {
            return Err(DomainError::invariant(format!(
                "discount code '{}' is expired or has no expiration",
                self.name
            )));
        }
        if self.quantity == 0 {
            return Err(DomainError::conflict(format!(
                "discount code '{}' has no redemptions left",
                self.name
            )));
        }
        if self.used_by.contains(&user) {
            return Err(DomainError::conflict(format!(
                "discount code '{}' was already used by {user}",
                self.name
            )));
        }
        if order_total < self.limit {
            return Err(DomainError::validation(format!(
                "order total {order_total} is below the minimum {} for '{}'",
                self.limit, self.name
            )));
        }

        self.quantity -= 1;
        self.used_by.insert(user);
        Ok(())
    }

    /// Order total after applying the reduction, floored at zero.
    pub fn apply_to(&self, order_total: u64) -> u64 {
        order_total.saturating_sub(self.price)
    }
}

impl Entity for DiscountCode {
    type Id = DiscountCodeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for DiscountCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} --- {}", self.name, self.quantity)
    }
}
