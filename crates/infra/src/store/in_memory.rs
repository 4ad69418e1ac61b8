use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use storefront_catalog::{
    BeforeSave, Category, Comment, CommentThread, DiscountCode, Favorite, Picture, Product,
    SaveContext, build_threads, sort_newest_first,
};
use storefront_core::entity::Timestamped;
use storefront_core::{
    CategoryId, CommentId, DiscountCodeId, DomainError, Entity, FavoriteId, PictureId, ProductId,
    Slug, UserId,
};

use super::{CatalogStore, StoreError, StoreResult};
use crate::config::CatalogConfig;

#[derive(Debug, Default)]
struct Tables {
    categories: HashMap<CategoryId, Category>,
    products: HashMap<ProductId, Product>,
    pictures: HashMap<PictureId, Picture>,
    favorites: HashMap<FavoriteId, Favorite>,
    comments: HashMap<CommentId, Comment>,
    discount_codes: HashMap<DiscountCodeId, DiscountCode>,
}

impl Tables {
    fn require_category(&self, id: CategoryId) -> Result<(), DomainError> {
        if self.categories.contains_key(&id) {
            Ok(())
        } else {
            Err(DomainError::not_found(format!("category {id}")))
        }
    }

    fn require_product(&self, id: ProductId) -> Result<(), DomainError> {
        if self.products.contains_key(&id) {
            Ok(())
        } else {
            Err(DomainError::not_found(format!("product {id}")))
        }
    }

    /// Walk up from `parent`; reaching `id` means the move would close a loop.
    fn ensure_acyclic(&self, id: CategoryId, parent: Option<CategoryId>) -> Result<(), DomainError> {
        let mut cursor = parent;
        let mut hops = 0usize;
        while let Some(current) = cursor {
            if current == id {
                return Err(DomainError::invariant(
                    "category cannot be placed under one of its own descendants",
                ));
            }
            hops += 1;
            if hops > self.categories.len() {
                return Err(DomainError::invariant("category tree already contains a cycle"));
            }
            cursor = self.categories.get(&current).and_then(Category::parent);
        }
        Ok(())
    }

    /// `root` and every category beneath it.
    fn category_subtree(&self, root: CategoryId) -> HashSet<CategoryId> {
        let mut seen = HashSet::from([root]);
        let mut pending = vec![root];
        while let Some(current) = pending.pop() {
            for child in self.categories.values() {
                if child.parent() == Some(current) && seen.insert(*child.id()) {
                    pending.push(*child.id());
                }
            }
        }
        seen
    }

    /// `root` and every reply beneath it.
    fn comment_subtree(&self, root: CommentId) -> HashSet<CommentId> {
        let mut seen = HashSet::from([root]);
        let mut pending = vec![root];
        while let Some(current) = pending.pop() {
            for reply in self.comments.values() {
                if reply.parent() == Some(current) && seen.insert(*reply.id()) {
                    pending.push(*reply.id());
                }
            }
        }
        seen
    }

    fn remove_product_cascade(&mut self, id: ProductId) -> bool {
        if self.products.remove(&id).is_none() {
            return false;
        }
        self.pictures.retain(|_, p| p.product() != id);
        self.favorites.retain(|_, f| f.product() != id);
        self.comments.retain(|_, c| c.product() != id);
        self.discount_codes.retain(|_, d| d.product() != id);
        true
    }
}

/// In-memory catalog store for tests/dev.
///
/// A single lock guards all tables, so each operation (including cascades and
/// discount redemption) is atomic with respect to every other.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    tables: RwLock<Tables>,
    save_ctx: SaveContext,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_save_context(save_ctx: SaveContext) -> Self {
        Self {
            tables: RwLock::default(),
            save_ctx,
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::with_save_context(config.save_context())
    }

    pub fn save_context(&self) -> SaveContext {
        self.save_ctx
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| StoreError::Poisoned)
    }
}

fn slug_conflict(kind: &str, slug: &Slug) -> StoreError {
    tracing::warn!(%slug, kind, "slug already taken");
    StoreError::Domain(DomainError::conflict(format!("{kind} slug '{slug}' is already taken")))
}

impl CatalogStore for InMemoryCatalogStore {
    fn save_category(&self, category: Category) -> StoreResult<Category> {
        let mut tables = self.write()?;
        let id = *category.id();

        if let Some(parent) = category.parent() {
            tables.require_category(parent)?;
            tables.ensure_acyclic(id, Some(parent))?;
        }
        if let Some(slug) = category.slug() {
            let taken = tables
                .categories
                .values()
                .any(|c| *c.id() != id && c.slug() == Some(slug));
            if taken {
                return Err(slug_conflict("category", slug));
            }
        }

        tables.categories.insert(id, category.clone());
        tracing::debug!(category_id = %id, "category saved");
        Ok(category)
    }

    fn category(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        Ok(self.read()?.categories.get(&id).cloned())
    }

    fn category_by_slug(&self, slug: &Slug) -> StoreResult<Option<Category>> {
        let tables = self.read()?;
        Ok(tables.categories.values().find(|c| c.slug() == Some(slug)).cloned())
    }

    fn root_categories(&self) -> StoreResult<Vec<Category>> {
        let tables = self.read()?;
        let mut roots: Vec<Category> = tables
            .categories
            .values()
            .filter(|c| c.is_root())
            .cloned()
            .collect();
        roots.sort_by(|a, b| a.created_at().cmp(&b.created_at()).then_with(|| a.id().cmp(b.id())));
        Ok(roots)
    }

    fn children(&self, id: CategoryId) -> StoreResult<Vec<Category>> {
        let tables = self.read()?;
        let mut children: Vec<Category> = tables
            .categories
            .values()
            .filter(|c| c.parent() == Some(id))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.created_at().cmp(&b.created_at()).then_with(|| a.id().cmp(b.id())));
        Ok(children)
    }

    fn delete_category(&self, id: CategoryId) -> StoreResult<()> {
        let mut tables = self.write()?;
        tables.require_category(id)?;

        let subtree = tables.category_subtree(id);
        tables.categories.retain(|cid, _| !subtree.contains(cid));

        let doomed: Vec<ProductId> = tables
            .products
            .values()
            .filter(|p| p.category().is_some_and(|c| subtree.contains(&c)))
            .map(|p| *p.id())
            .collect();
        for product in &doomed {
            tables.remove_product_cascade(*product);
        }

        tracing::debug!(
            category_id = %id,
            categories = subtree.len(),
            products = doomed.len(),
            "category deleted"
        );
        Ok(())
    }

    fn save_product(&self, mut product: Product) -> StoreResult<Product> {
        let mut tables = self.write()?;
        let id = *product.id();

        if let Some(category) = product.category() {
            tables.require_category(category)?;
        }
        if let Some(slug) = product.slug() {
            let taken = tables
                .products
                .values()
                .any(|p| *p.id() != id && p.slug() == Some(slug));
            if taken {
                return Err(slug_conflict("product", slug));
            }
        }

        product.before_save(&self.save_ctx);
        tables.products.insert(id, product.clone());
        tracing::debug!(
            product_id = %id,
            price = product.price(),
            discount = ?product.discount(),
            discounted_price = ?product.discounted_price(),
            "product saved"
        );
        Ok(product)
    }

    fn product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    fn product_by_slug(&self, slug: &Slug) -> StoreResult<Option<Product>> {
        let tables = self.read()?;
        Ok(tables.products.values().find(|p| p.slug() == Some(slug)).cloned())
    }

    fn products_in_category(&self, category: CategoryId) -> StoreResult<Vec<Product>> {
        let tables = self.read()?;
        let mut products: Vec<Product> = tables
            .products
            .values()
            .filter(|p| p.category() == Some(category))
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then_with(|| b.id().cmp(a.id())));
        Ok(products)
    }

    fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.remove_product_cascade(id) {
            return Err(DomainError::not_found(format!("product {id}")).into());
        }
        tracing::debug!(product_id = %id, "product deleted");
        Ok(())
    }

    fn save_picture(&self, picture: Picture) -> StoreResult<Picture> {
        let mut tables = self.write()?;
        tables.require_product(picture.product())?;
        tables.pictures.insert(*picture.id(), picture.clone());
        Ok(picture)
    }

    fn pictures_of(&self, product: ProductId) -> StoreResult<Vec<Picture>> {
        let tables = self.read()?;
        let mut pictures: Vec<Picture> = tables
            .pictures
            .values()
            .filter(|p| p.product() == product)
            .cloned()
            .collect();
        pictures.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(pictures)
    }

    fn delete_picture(&self, id: PictureId) -> StoreResult<()> {
        let mut tables = self.write()?;
        match tables.pictures.remove(&id) {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found(format!("picture {id}")).into()),
        }
    }

    fn add_favorite(&self, favorite: Favorite) -> StoreResult<Favorite> {
        let mut tables = self.write()?;
        tables.require_product(favorite.product())?;
        tables.favorites.insert(*favorite.id(), favorite);
        Ok(favorite)
    }

    fn remove_favorite(&self, id: FavoriteId) -> StoreResult<()> {
        let mut tables = self.write()?;
        match tables.favorites.remove(&id) {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found(format!("favorite {id}")).into()),
        }
    }

    fn is_favorite(&self, user: UserId, product: ProductId) -> StoreResult<bool> {
        let tables = self.read()?;
        Ok(tables.favorites.values().any(|f| f.is_pair(user, product)))
    }

    fn favorites_of(&self, user: UserId) -> StoreResult<Vec<Favorite>> {
        let tables = self.read()?;
        let mut favorites: Vec<Favorite> = tables
            .favorites
            .values()
            .filter(|f| f.user() == user)
            .copied()
            .collect();
        favorites.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(favorites)
    }

    fn save_comment(&self, comment: Comment) -> StoreResult<Comment> {
        let mut tables = self.write()?;
        tables.require_product(comment.product())?;

        if let Some(parent_id) = comment.parent() {
            let parent = tables
                .comments
                .get(&parent_id)
                .ok_or_else(|| DomainError::not_found(format!("comment {parent_id}")))?;
            if parent.product() != comment.product() {
                return Err(DomainError::invariant(
                    "reply must belong to the same product as its parent comment",
                )
                .into());
            }
        }

        tables.comments.insert(*comment.id(), comment.clone());
        tracing::debug!(comment_id = %comment.id(), active = comment.is_active(), "comment saved");
        Ok(comment)
    }

    fn comments_for(&self, product: ProductId) -> StoreResult<Vec<Comment>> {
        let tables = self.read()?;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.product() == product && c.is_active())
            .cloned()
            .collect();
        sort_newest_first(&mut comments);
        Ok(comments)
    }

    fn comment_threads(&self, product: ProductId) -> StoreResult<Vec<CommentThread>> {
        let tables = self.read()?;
        let comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.product() == product)
            .cloned()
            .collect();
        Ok(build_threads(&comments))
    }

    fn delete_comment(&self, id: CommentId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.comments.contains_key(&id) {
            return Err(DomainError::not_found(format!("comment {id}")).into());
        }
        let subtree = tables.comment_subtree(id);
        tables.comments.retain(|cid, _| !subtree.contains(cid));
        Ok(())
    }

    fn save_discount_code(&self, code: DiscountCode) -> StoreResult<DiscountCode> {
        let mut tables = self.write()?;
        tables.require_product(code.product())?;
        tables.discount_codes.insert(*code.id(), code.clone());
        Ok(code)
    }

    fn discount_code(&self, id: DiscountCodeId) -> StoreResult<Option<DiscountCode>> {
        Ok(self.read()?.discount_codes.get(&id).cloned())
    }

    fn redeem_discount_code(
        &self,
        id: DiscountCodeId,
        user: UserId,
        order_total: u64,
        now: DateTime<Utc>,
    ) -> StoreResult<DiscountCode> {
        let mut tables = self.write()?;
        let code = tables
            .discount_codes
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("discount code {id}")))?;

        if let Err(e) = code.redeem(user, order_total, now) {
            tracing::warn!(discount_code_id = %id, %user, error = %e, "discount code redemption rejected");
            return Err(e.into());
        }

        tracing::debug!(discount_code_id = %id, %user, remaining = code.quantity(), "discount code redeemed");
        Ok(code.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_catalog::{NewCategory, NewProduct, ReconcileMode};

    fn category(store: &InMemoryCatalogStore, parent: Option<CategoryId>, title: &str) -> Category {
        let new = NewCategory {
            title: title.to_string(),
            parent,
            slug: None,
        };
        store
            .save_category(Category::create(CategoryId::new(), new, Utc::now()).unwrap())
            .unwrap()
    }

    #[test]
    fn ensure_acyclic_rejects_moving_under_descendant() {
        let store = InMemoryCatalogStore::new();
        let root = category(&store, None, "Home");
        let child = category(&store, Some(*root.id()), "Kitchen");
        let grandchild = category(&store, Some(*child.id()), "Mugs");

        let mut moved = root.clone();
        moved.set_parent(Some(*grandchild.id())).unwrap();
        let err = store.save_category(moved).unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::InvariantViolation(_))));
        assert!(store.category(*root.id()).unwrap().unwrap().is_root());
    }

    #[test]
    fn save_product_uses_configured_mode() {
        let store = InMemoryCatalogStore::with_save_context(SaveContext::new(ReconcileMode::Corrected));
        let product = Product::create(ProductId::new(), NewProduct::new("Mug", "", 1000), Utc::now())
            .unwrap();

        let saved = store.save_product(product).unwrap();
        assert_eq!(saved.discount(), Some(0.0));
        assert_eq!(saved.discounted_price(), Some(1000));
    }

    #[test]
    fn poisoned_lock_is_reported() {
        let store = std::sync::Arc::new(InMemoryCatalogStore::new());
        let clone = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = clone.tables.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(store.product(ProductId::new()), Err(StoreError::Poisoned)));
    }
}
