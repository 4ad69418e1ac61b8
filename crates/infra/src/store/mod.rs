//! Persistence collaborator for catalog records.
//!
//! The store owns what the domain records cannot check on their own:
//! referential integrity, slug uniqueness, the category forest, cascade
//! deletes, and running [`BeforeSave`](storefront_catalog::BeforeSave) inside
//! the same write that commits a product.

pub mod in_memory;

pub use in_memory::InMemoryCatalogStore;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use storefront_catalog::{Category, Comment, CommentThread, DiscountCode, Favorite, Picture, Product};
use storefront_core::{
    CategoryId, CommentId, DiscountCodeId, DomainError, FavoriteId, PictureId, ProductId, Slug,
    UserId,
};

/// Store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The write was rejected by a domain or integrity rule.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A previous writer panicked while holding the lock.
    #[error("store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Catalog persistence boundary.
///
/// Saves are upserts keyed by the record id. Every successful save or delete
/// is atomic: either the record and all cascaded changes are visible, or
/// nothing is.
pub trait CatalogStore: Send + Sync {
    fn save_category(&self, category: Category) -> StoreResult<Category>;
    fn category(&self, id: CategoryId) -> StoreResult<Option<Category>>;
    fn category_by_slug(&self, slug: &Slug) -> StoreResult<Option<Category>>;
    /// Root categories, oldest first.
    fn root_categories(&self) -> StoreResult<Vec<Category>>;
    /// Direct children, oldest first.
    fn children(&self, id: CategoryId) -> StoreResult<Vec<Category>>;
    /// Removes the category, its descendants and every product filed under them.
    fn delete_category(&self, id: CategoryId) -> StoreResult<()>;

    /// Runs the product's `before_save` hook, then commits. Returns the
    /// record as committed.
    fn save_product(&self, product: Product) -> StoreResult<Product>;
    fn product(&self, id: ProductId) -> StoreResult<Option<Product>>;
    fn product_by_slug(&self, slug: &Slug) -> StoreResult<Option<Product>>;
    /// Products filed directly under `category`, newest first.
    fn products_in_category(&self, category: CategoryId) -> StoreResult<Vec<Product>>;
    /// Removes the product with its pictures, favorites, comments and codes.
    fn delete_product(&self, id: ProductId) -> StoreResult<()>;

    fn save_picture(&self, picture: Picture) -> StoreResult<Picture>;
    fn pictures_of(&self, product: ProductId) -> StoreResult<Vec<Picture>>;
    fn delete_picture(&self, id: PictureId) -> StoreResult<()>;

    fn add_favorite(&self, favorite: Favorite) -> StoreResult<Favorite>;
    fn remove_favorite(&self, id: FavoriteId) -> StoreResult<()>;
    fn is_favorite(&self, user: UserId, product: ProductId) -> StoreResult<bool>;
    fn favorites_of(&self, user: UserId) -> StoreResult<Vec<Favorite>>;

    fn save_comment(&self, comment: Comment) -> StoreResult<Comment>;
    /// Active comments on `product`, newest first.
    fn comments_for(&self, product: ProductId) -> StoreResult<Vec<Comment>>;
    fn comment_threads(&self, product: ProductId) -> StoreResult<Vec<CommentThread>>;
    /// Removes the comment and every reply beneath it.
    fn delete_comment(&self, id: CommentId) -> StoreResult<()>;

    fn save_discount_code(&self, code: DiscountCode) -> StoreResult<DiscountCode>;
    fn discount_code(&self, id: DiscountCodeId) -> StoreResult<Option<DiscountCode>>;
    /// Validates and consumes one use of the code in a single write.
    fn redeem_discount_code(
        &self,
        id: DiscountCodeId,
        user: UserId,
        order_total: u64,
        now: DateTime<Utc>,
    ) -> StoreResult<DiscountCode>;
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn save_category(&self, category: Category) -> StoreResult<Category> {
        (**self).save_category(category)
    }

    fn category(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        (**self).category(id)
    }

    fn category_by_slug(&self, slug: &Slug) -> StoreResult<Option<Category>> {
        (**self).category_by_slug(slug)
    }

    fn root_categories(&self) -> StoreResult<Vec<Category>> {
        (**self).root_categories()
    }

    fn children(&self, id: CategoryId) -> StoreResult<Vec<Category>> {
        (**self).children(id)
    }

    fn delete_category(&self, id: CategoryId) -> StoreResult<()> {
        (**self).delete_category(id)
    }

    fn save_product(&self, product: Product) -> StoreResult<Product> {
        (**self).save_product(product)
    }

    fn product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        (**self).product(id)
    }

    fn product_by_slug(&self, slug: &Slug) -> StoreResult<Option<Product>> {
        (**self).product_by_slug(slug)
    }

    fn products_in_category(&self, category: CategoryId) -> StoreResult<Vec<Product>> {
        (**self).products_in_category(category)
    }

    fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        (**self).delete_product(id)
    }

    fn save_picture(&self, picture: Picture) -> StoreResult<Picture> {
        (**self).save_picture(picture)
    }

    fn pictures_of(&self, product: ProductId) -> StoreResult<Vec<Picture>> {
        (**self).pictures_of(product)
    }

    fn delete_picture(&self, id: PictureId) -> StoreResult<()> {
        (**self).delete_picture(id)
    }

    fn add_favorite(&self, favorite: Favorite) -> StoreResult<Favorite> {
        (**self).add_favorite(favorite)
    }

    fn remove_favorite(&self, id: FavoriteId) -> StoreResult<()> {
        (**self).remove_favorite(id)
    }

    fn is_favorite(&self, user: UserId, product: ProductId) -> StoreResult<bool> {
        (**self).is_favorite(user, product)
    }

    fn favorites_of(&self, user: UserId) -> StoreResult<Vec<Favorite>> {
        (**self).favorites_of(user)
    }

    fn save_comment(&self, comment: Comment) -> StoreResult<Comment> {
        (**self).save_comment(comment)
    }

    fn comments_for(&self, product: ProductId) -> StoreResult<Vec<Comment>> {
        (**self).comments_for(product)
    }

    fn comment_threads(&self, product: ProductId) -> StoreResult<Vec<CommentThread>> {
        (**self).comment_threads(product)
    }

    fn delete_comment(&self, id: CommentId) -> StoreResult<()> {
        (**self).delete_comment(id)
    }

    fn save_discount_code(&self, code: DiscountCode) -> StoreResult<DiscountCode> {
        (**self).save_discount_code(code)
    }

    fn discount_code(&self, id: DiscountCodeId) -> StoreResult<Option<DiscountCode>> {
        (**self).discount_code(id)
    }

    fn redeem_discount_code(
        &self,
        id: DiscountCodeId,
        user: UserId,
        order_total: u64,
        now: DateTime<Utc>,
    ) -> StoreResult<DiscountCode> {
        (**self).redeem_discount_code(id, user, order_total, now)
    }
}
