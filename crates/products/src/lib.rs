//! Products domain module.
//!
//! This crate contains business rules for the polymorphic catalog, implemented purely
//! as deterministic domain logic (no IO, no storage): product kinds and their attribute
//! schemas, the shared catalog record, its draft/published lifecycle, and the typed
//! partial-update structures used to route updates to the right record.

pub mod attributes;
pub mod kind;
pub mod lifecycle;
pub mod patch;
pub mod product;

pub use attributes::{
    AttributeRecord, Clothing, ClothingPatch, Dimensions, DimensionsPatch, Electronics, ElectronicsPatch,
    Furniture, FurniturePatch, ProductAttributes,
};
pub use kind::ProductKind;
pub use lifecycle::ProductState;
pub use patch::{FieldPatch, strip_nulls};
pub use product::{
    CatalogRecord, DEFAULT_RATING, NewProduct, ProductPatch, ProductUpdate, Variation, slugify,
};
