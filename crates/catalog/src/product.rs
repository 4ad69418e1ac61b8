use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::entity::Timestamped;
use storefront_core::error::ensure_text;
use storefront_core::{CategoryId, DomainResult, Entity, ProductId, Slug};

use crate::format::PriceFormat;
use crate::hooks::{BeforeSave, SaveContext};
use crate::pricing::{PriceInput, reconcile};

pub const TITLE_MAX_CHARS: usize = 100;

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub category: Option<CategoryId>,
    pub price: u64,
    pub discount: Option<f64>,
    pub discounted_price: Option<u64>,
    pub slug: Option<Slug>,
}

impl NewProduct {
    /// Product at full price with no category, slug or discount.
    pub fn new(title: impl Into<String>, description: impl Into<String>, price: u64) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: None,
            price,
            discount: None,
            discounted_price: None,
            slug: None,
        }
    }
}

/// Catalog product.
///
/// `discount` is a percentage (0-100 expected, not enforced here) and
/// `discounted_price` an amount in the smallest whole currency unit. Until the
/// record has been through [`BeforeSave`], the two may disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    title: String,
    description: String,
    category: Option<CategoryId>,
    price: u64,
    discount: Option<f64>,
    discounted_price: Option<u64>,
    slug: Option<Slug>,
    created_at: DateTime<Utc>,
}

impl Product {
    pub fn create(id: ProductId, new: NewProduct, created_at: DateTime<Utc>) -> DomainResult<Self> {
        ensure_text("title", &new.title, TITLE_MAX_CHARS)?;

        Ok(Self {
            id,
            title: new.title,
            description: new.description,
            category: new.category,
            price: new.price,
            discount: new.discount,
            discounted_price: new.discounted_price,
            slug: new.slug,
            created_at,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> Option<CategoryId> {
        self.category
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn discount(&self) -> Option<f64> {
        self.discount
    }

    pub fn discounted_price(&self) -> Option<u64> {
        self.discounted_price
    }

    pub fn slug(&self) -> Option<&Slug> {
        self.slug.as_ref()
    }

    pub fn rename(&mut self, title: impl Into<String>) -> DomainResult<()> {
        let title = title.into();
        ensure_text("title", &title, TITLE_MAX_CHARS)?;
        self.title = title;
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_category(&mut self, category: Option<CategoryId>) {
        self.category = category;
    }

    pub fn set_slug(&mut self, slug: Option<Slug>) {
        self.slug = slug;
    }

    /// Replace all pricing fields; reconciled again on the next save.
    pub fn set_pricing(&mut self, price: u64, discount: Option<f64>, discounted_price: Option<u64>) {
        self.price = price;
        self.discount = discount;
        self.discounted_price = discounted_price;
    }

    pub fn formatted_price(&self, format: &PriceFormat) -> String {
        format.format(self.price)
    }

    /// `None` until a discounted price exists (i.e. before the first save).
    pub fn formatted_discounted_price(&self, format: &PriceFormat) -> Option<String> {
        self.discounted_price.map(|amount| format.format(amount))
    }

    /// Whether the committed discounted price is below the full price.
    pub fn is_discounted(&self) -> bool {
        self.discounted_price.is_some_and(|dp| dp < self.price)
    }
}

impl BeforeSave for Product {
    fn before_save(&mut self, ctx: &SaveContext) {
        let out = reconcile(
            PriceInput {
                price: self.price,
                discount: self.discount,
                discounted_price: self.discounted_price,
            },
            ctx.reconcile_mode,
        );
        self.discount = out.discount;
        self.discounted_price = Some(out.discounted_price);
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Timestamped for Product {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl core::fmt::Display for Product {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::ReconcileMode;
    use storefront_core::DomainError;

    fn product(price: u64, discount: Option<f64>, discounted_price: Option<u64>) -> Product {
        let mut new = NewProduct::new("Ceramic mug", "350ml, dishwasher safe", price);
        new.discount = discount;
        new.discounted_price = discounted_price;
        Product::create(ProductId::new(), new, Utc::now()).unwrap()
    }

    #[test]
    fn create_rejects_empty_title() {
        let err = Product::create(ProductId::new(), NewProduct::new("  ", "", 10), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn create_rejects_overlong_title() {
        let title = "x".repeat(TITLE_MAX_CHARS + 1);
        let err = Product::create(ProductId::new(), NewProduct::new(title, "", 10), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn before_save_derives_discounted_price() {
        let mut p = product(1000, Some(10.0), None);
        p.before_save(&SaveContext::default());
        assert_eq!(p.discounted_price(), Some(900));
        assert_eq!(p.discount(), Some(10.0));
        assert!(p.is_discounted());
    }

    #[test]
    fn before_save_without_discount_sets_full_price() {
        let mut p = product(1000, None, None);
        p.before_save(&SaveContext::default());
        assert_eq!(p.discounted_price(), Some(1000));
        assert_eq!(p.discount(), None);
        assert!(!p.is_discounted());
    }

    #[test]
    fn repricing_is_reconciled_on_next_save() {
        let mut p = product(1000, Some(10.0), None);
        p.before_save(&SaveContext::default());

        p.set_pricing(2000, None, Some(1500));
        p.before_save(&SaveContext::new(ReconcileMode::Corrected));
        assert_eq!(p.discounted_price(), Some(1500));
        assert_eq!(p.discount(), Some(25.0));
    }

    #[test]
    fn formatted_prices_use_configured_suffix() {
        let mut p = product(1_250_000, Some(20.0), None);
        let fmt = PriceFormat::new("USD");
        assert_eq!(p.formatted_discounted_price(&fmt), None);

        p.before_save(&SaveContext::default());
        assert_eq!(p.formatted_price(&fmt), "1,250,000 USD");
        assert_eq!(p.formatted_discounted_price(&fmt).as_deref(), Some("1,000,000 USD"));
    }

    #[test]
    fn display_is_title() {
        assert_eq!(product(1, None, None).to_string(), "Ceramic mug");
    }
}
