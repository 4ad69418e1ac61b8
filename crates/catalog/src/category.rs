use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::entity::Timestamped;
use storefront_core::error::ensure_text;
use storefront_core::{CategoryId, DomainError, DomainResult, Entity, Slug};

pub const TITLE_MAX_CHARS: usize = 50;

/// Input for creating a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub title: String,
    pub parent: Option<CategoryId>,
    pub slug: Option<Slug>,
}

impl NewCategory {
    pub fn root(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            parent: None,
            slug: None,
        }
    }

    pub fn child_of(parent: CategoryId, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            parent: Some(parent),
            slug: None,
        }
    }
}

/// Node of the category forest.
///
/// Only the direct parent link is kept here. Whether the parent exists is
/// checked by the store that owns the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    title: String,
    parent: Option<CategoryId>,
    slug: Option<Slug>,
    created_at: DateTime<Utc>,
}

impl Category {
    pub fn create(id: CategoryId, new: NewCategory, created_at: DateTime<Utc>) -> DomainResult<Self> {
        ensure_text("title", &new.title, TITLE_MAX_CHARS)?;
        ensure_not_own_parent(id, new.parent)?;

        Ok(Self {
            id,
            title: new.title,
            parent: new.parent,
            slug: new.slug,
            created_at,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn parent(&self) -> Option<CategoryId> {
        self.parent
    }

    pub fn slug(&self) -> Option<&Slug> {
        self.slug.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn rename(&mut self, title: impl Into<String>) -> DomainResult<()> {
        let title = title.into();
        ensure_text("title", &title, TITLE_MAX_CHARS)?;
        self.title = title;
        Ok(())
    }

    pub fn set_parent(&mut self, parent: Option<CategoryId>) -> DomainResult<()> {
        ensure_not_own_parent(self.id, parent)?;
        self.parent = parent;
        Ok(())
    }

    pub fn set_slug(&mut self, slug: Option<Slug>) {
        self.slug = slug;
    }
}

fn ensure_not_own_parent(id: CategoryId, parent: Option<CategoryId>) -> DomainResult<()> {
    if parent == Some(id) {
        return Err(DomainError::invariant("category cannot be its own parent"));
    }
    Ok(())
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Timestamped for Category {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_category_has_no_parent() {
        let c = Category::create(CategoryId::new(), NewCategory::root("Kitchen"), Utc::now()).unwrap();
        assert!(c.is_root());
        assert_eq!(c.to_string(), "Kitchen");
    }

    #[test]
    fn create_rejects_self_parent() {
        let id = CategoryId::new();
        let err = Category::create(id, NewCategory::child_of(id, "Loop"), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn set_parent_rejects_self_and_keeps_old_parent() {
        let parent = CategoryId::new();
        let id = CategoryId::new();
        let mut c = Category::create(id, NewCategory::child_of(parent, "Mugs"), Utc::now()).unwrap();

        assert!(c.set_parent(Some(id)).is_err());
        assert_eq!(c.parent(), Some(parent));
    }

    #[test]
    fn title_is_limited_to_fifty_characters() {
        let ok = "a".repeat(TITLE_MAX_CHARS);
        let too_long = "a".repeat(TITLE_MAX_CHARS + 1);
        assert!(Category::create(CategoryId::new(), NewCategory::root(ok), Utc::now()).is_ok());
        assert!(Category::create(CategoryId::new(), NewCategory::root(too_long), Utc::now()).is_err());
    }
}
