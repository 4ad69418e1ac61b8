//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**. A slug or an image path is defined
//! entirely by its text; two with the same text are the same value.

/// Marker trait for value objects.
///
/// - **Value Object**: `Slug("blue-mug")`, `ImageRef("products/picture/mug.jpg")`
/// - **Entity**: `Product { id: ProductId(...), .. }`
///
/// Value objects are validated once on construction and never mutated
/// afterwards; to "change" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
