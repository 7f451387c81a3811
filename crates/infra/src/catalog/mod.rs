//! Polymorphic product catalog.
//!
//! A product is a base record shared by all kinds plus one attribute document in its
//! kind's collection, and one inventory record. Writes enter through the
//! [`ProductRegistry`], which dispatches on kind name to a [`ProductKindHandler`]; reads
//! go through [`CatalogQueries`]. [`CatalogService`] puts permission checks in front of
//! both.

pub mod attribute_store;
pub mod base;
pub mod error;
pub mod handler;
pub mod inventory;
pub mod query;
pub mod registry;
pub mod service;

pub use attribute_store::AttributeStore;
pub use base::BaseCatalog;
pub use error::{CatalogError, CatalogResult, WriteStage};
pub use handler::{KindHandler, ProductKindHandler};
pub use inventory::InventoryCoordinator;
pub use query::{BrowseFilter, BrowseQuery, CatalogQueries, ProductDetail, ProductSummary, SearchResults};
pub use registry::ProductRegistry;
pub use service::{CatalogService, CatalogServiceBuilder};
