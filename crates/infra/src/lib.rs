//! Infrastructure layer: configuration and the persistence collaborator.

pub mod config;
pub mod store;

pub use config::{CatalogConfig, ConfigError};
pub use store::{CatalogStore, InMemoryCatalogStore, StoreError};
