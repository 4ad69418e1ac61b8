//! `storefront-core` — shared building blocks for the catalog domain.
//!
//! Identifiers, the domain error model and small value objects. No storage,
//! no IO.

pub mod entity;
pub mod error;
pub mod id;
pub mod slug;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, CommentId, DiscountCodeId, FavoriteId, PictureId, ProductId, UserId};
pub use slug::Slug;
pub use value_object::ValueObject;
