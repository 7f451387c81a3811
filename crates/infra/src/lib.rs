//! Infrastructure layer: catalog storage, kind dispatch, queries and configuration.

pub mod catalog;
pub mod config;
pub mod store;


pub use catalog::{CatalogError, CatalogResult, CatalogService};
pub use config::{CatalogConfig, ConfigError};
pub use store::{CatalogStore, InMemoryCatalogStore, StoreError};
