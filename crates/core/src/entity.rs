//! Entity trait: identity + continuity across saves.

use chrono::{DateTime, Utc};

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Entities stamped with an insertion time (`auto_now_add` style).
pub trait Timestamped {
    fn created_at(&self) -> DateTime<Utc>;
}
