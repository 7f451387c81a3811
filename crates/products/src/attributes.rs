//! Kind-specific attribute schemas.
//!
//! Each product kind owns one attribute document per catalog record. A schema is a
//! plain serde struct implementing [`ProductAttributes`]; its associated `Patch` type is
//! the typed partial update accepted for that kind. Adding a kind means adding a schema
//! here (or in any downstream crate) and registering a handler for it.

use core::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use storefront_core::{AttributeId, DomainError, DomainResult, ShopId};

use crate::kind::ProductKind;
use crate::patch::FieldPatch;

/// Stored attribute document, owned by exactly one catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub id: AttributeId,
    pub kind: ProductKind,
    pub shop: ShopId,
    pub fields: JsonValue,
    pub updated_at: DateTime<Utc>,
}

impl AttributeRecord {
    /// Decode the stored document into its typed schema.
    pub fn decode<A: ProductAttributes>(&self) -> DomainResult<A> {
        serde_json::from_value(self.fields.clone()).map_err(|e| {
            DomainError::invariant(format!("stored {} attributes do not decode: {e}", A::KIND))
        })
    }
}

/// Attribute schema of one product kind.
pub trait ProductAttributes:
    Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static
{
    /// Typed partial update for this schema (every field optional).
    type Patch: Serialize + DeserializeOwned + Debug + Send;

    /// Kind name this schema is registered under.
    const KIND: &'static str;

    /// Storage collection holding attribute records of this kind.
    const COLLECTION: &'static str;

    /// Check field-level rules beyond what deserialization enforces.
    fn validate(&self) -> DomainResult<()>;

    /// Check a partial update before it is flattened.
    fn validate_patch(_patch: &Self::Patch) -> DomainResult<()> {
        Ok(())
    }

    /// Parse and validate a full attribute document.
    fn parse(raw: JsonValue) -> DomainResult<Self> {
        let attrs: Self = serde_json::from_value(raw).map_err(|e| {
            DomainError::validation(format!("invalid {} attributes: {e}", Self::KIND))
        })?;
        attrs.validate()?;
        Ok(attrs)
    }

    /// Parse a partial update into this kind's patch and flatten it to dotted paths.
    fn parse_patch(raw: JsonValue) -> DomainResult<FieldPatch> {
        let patch: Self::Patch = serde_json::from_value(raw).map_err(|e| {
            DomainError::validation(format!("invalid {} attribute update: {e}", Self::KIND))
        })?;
        Self::validate_patch(&patch)?;
        FieldPatch::from_typed(&patch)
    }

    /// Document representation stored in the attribute collection.
    fn to_document(&self) -> DomainResult<JsonValue> {
        serde_json::to_value(self)
            .map_err(|e| DomainError::invariant(format!("unserializable {} attributes: {e}", Self::KIND)))
    }
}

fn require_text(kind: &str, field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{kind} {field} cannot be empty")));
    }
    Ok(())
}

fn require_optional_text(kind: &str, field: &str, value: Option<&String>) -> DomainResult<()> {
    match value {
        Some(v) => require_text(kind, field, v),
        None => Ok(()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clothing
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Clothing {
    pub size: String,
    pub material: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClothingPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl ProductAttributes for Clothing {
    type Patch = ClothingPatch;

    const KIND: &'static str = "Clothing";
    const COLLECTION: &'static str = "clothes";

    fn validate(&self) -> DomainResult<()> {
        require_text(Self::KIND, "size", &self.size)?;
        require_text(Self::KIND, "material", &self.material)?;
        require_optional_text(Self::KIND, "brand", self.brand.as_ref())
    }

    fn validate_patch(patch: &ClothingPatch) -> DomainResult<()> {
        require_optional_text(Self::KIND, "size", patch.size.as_ref())?;
        require_optional_text(Self::KIND, "material", patch.material.as_ref())?;
        require_optional_text(Self::KIND, "brand", patch.brand.as_ref())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Electronics
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Electronics {
    pub manufacturer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElectronicsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ProductAttributes for Electronics {
    type Patch = ElectronicsPatch;

    const KIND: &'static str = "Electronics";
    const COLLECTION: &'static str = "electronics";

    fn validate(&self) -> DomainResult<()> {
        require_text(Self::KIND, "manufacturer", &self.manufacturer)
    }

    fn validate_patch(patch: &ElectronicsPatch) -> DomainResult<()> {
        require_optional_text(Self::KIND, "manufacturer", patch.manufacturer.as_ref())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Furniture
// ─────────────────────────────────────────────────────────────────────────────

/// Physical dimensions (unit chosen by the seller, typically centimetres).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DimensionsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Furniture {
    pub material: String,
    pub dimensions: Dimensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FurniturePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<DimensionsPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

fn require_dimension(field: &str, value: f64) -> DomainResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DomainError::validation(format!(
            "Furniture dimensions.{field} must be a positive number"
        )));
    }
    Ok(())
}

impl ProductAttributes for Furniture {
    type Patch = FurniturePatch;

    const KIND: &'static str = "Furniture";
    const COLLECTION: &'static str = "furnitures";

    fn validate(&self) -> DomainResult<()> {
        require_text(Self::KIND, "material", &self.material)?;
        require_optional_text(Self::KIND, "brand", self.brand.as_ref())?;
        require_dimension("width", self.dimensions.width)?;
        require_dimension("height", self.dimensions.height)?;
        require_dimension("depth", self.dimensions.depth)
    }

    fn validate_patch(patch: &FurniturePatch) -> DomainResult<()> {
        require_optional_text(Self::KIND, "material", patch.material.as_ref())?;
        require_optional_text(Self::KIND, "brand", patch.brand.as_ref())?;
        if let Some(d) = &patch.dimensions {
            for (field, value) in [("width", d.width), ("height", d.height), ("depth", d.depth)] {
                if let Some(v) = value {
                    require_dimension(field, v)?;
                }
            }
        }
        Ok(())
    }
}
