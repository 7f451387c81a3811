use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use storefront_core::{AttributeId, DomainError, DomainResult, ProductId, ShopId};

use crate::kind::ProductKind;
use crate::lifecycle::ProductState;
use crate::patch::strip_nulls;

/// Rating every new record starts with.
pub const DEFAULT_RATING: f64 = 4.5;

/// Variation axis offered for a product (e.g. "color" with its options).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Variation {
    pub name: String,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Shared, kind-independent product record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: ProductId,
    pub shop: ShopId,
    pub kind: ProductKind,
    pub name: String,
    pub slug: String,
    pub thumbnail: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: u64,
    pub attributes_ref: AttributeId,
    #[serde(flatten, with = "crate::lifecycle::flags")]
    pub state: ProductState,
    pub rating: f64,
    pub variations: Vec<Variation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Incremented on every write; internal, never exposed by single-record fetches.
    pub version: u64,
}

impl CatalogRecord {
    /// Build the draft record owning `attributes_ref`.
    pub fn draft(
        shop: ShopId,
        kind: ProductKind,
        attributes_ref: AttributeId,
        product: &NewProduct,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ProductId::owning(attributes_ref),
            shop,
            kind,
            name: product.name.clone(),
            slug: slugify(&product.name),
            thumbnail: product.thumbnail.clone(),
            description: product.description.clone(),
            price: product.price,
            quantity: product.quantity,
            attributes_ref,
            state: ProductState::Draft,
            rating: DEFAULT_RATING,
            variations: product.variations.clone(),
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    pub fn is_draft(&self) -> bool {
        self.state.is_draft()
    }

    pub fn is_published(&self) -> bool {
        self.state.is_published()
    }

    /// Apply a base-field partial update. `updated_at` moves even for an empty patch.
    pub fn apply_patch(&mut self, patch: &ProductPatch, now: DateTime<Utc>) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
            self.slug = slugify(name);
        }
        if let Some(thumbnail) = &patch.thumbnail {
            self.thumbnail = thumbnail.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(variations) = &patch.variations {
            self.variations = variations.clone();
        }
        self.touch(now);
    }

    pub fn publish(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.state = self.state.publish()?;
        self.touch(now);
        Ok(())
    }

    pub fn unpublish(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.state = self.state.unpublish()?;
        self.touch(now);
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version += 1;
    }
}

/// Creation payload: base fields plus the kind's raw attribute document.
///
/// The attribute document stays untyped here; the kind handler parses it into its
/// own schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewProduct {
    pub name: String,
    pub thumbnail: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub quantity: u64,
    /// Optional echo of the owning shop; must match the caller when present.
    #[serde(default)]
    pub shop: Option<ShopId>,
    #[serde(default)]
    pub variations: Vec<Variation>,
    pub attributes: JsonValue,
}

impl NewProduct {
    pub fn from_json(raw: JsonValue) -> DomainResult<Self> {
        let product: Self = serde_json::from_value(strip_nulls(raw))
            .map_err(|e| DomainError::validation(format!("invalid product payload: {e}")))?;
        product.validate()?;
        Ok(product)
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_name(&self.name)?;
        validate_thumbnail(&self.thumbnail)?;
        validate_price(self.price)?;
        validate_variations(&self.variations)?;
        if !self.attributes.is_object() {
            return Err(DomainError::validation("attributes must be a JSON object"));
        }
        Ok(())
    }
}

/// Typed partial update of the base record. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variations: Option<Vec<Variation>>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(thumbnail) = &self.thumbnail {
            validate_thumbnail(thumbnail)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(variations) = &self.variations {
            validate_variations(variations)?;
        }
        Ok(())
    }
}

/// An update payload split structurally: the `attributes` object goes to the kind's
/// attribute record, everything else to the base record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    pub base: ProductPatch,
    pub attributes: Option<JsonValue>,
}

impl ProductUpdate {
    /// Sanitize (drop nulls) and split a raw update payload.
    pub fn from_json(raw: JsonValue) -> DomainResult<Self> {
        let JsonValue::Object(mut fields) = strip_nulls(raw) else {
            return Err(DomainError::validation("update payload must be a JSON object"));
        };

        let attributes = match fields.remove("attributes") {
            Some(JsonValue::Object(map)) if map.is_empty() => None,
            Some(obj @ JsonValue::Object(_)) => Some(obj),
            Some(_) => return Err(DomainError::validation("attributes must be a JSON object")),
            None => None,
        };

        let base: ProductPatch = serde_json::from_value(JsonValue::Object(fields))
            .map_err(|e| DomainError::validation(format!("invalid product update: {e}")))?;
        base.validate()?;

        Ok(Self { base, attributes })
    }
}

/// URL-friendly form of a product name: lowercase alphanumerics joined by single hyphens.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(())
}

fn validate_thumbnail(thumbnail: &str) -> DomainResult<()> {
    if thumbnail.trim().is_empty() {
        return Err(DomainError::validation("thumbnail cannot be empty"));
    }
    Ok(())
}

fn validate_price(price: f64) -> DomainResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(DomainError::validation("price must be a non-negative number"));
    }
    Ok(())
}

fn validate_variations(variations: &[Variation]) -> DomainResult<()> {
    if variations.iter().any(|v| v.name.trim().is_empty()) {
        return Err(DomainError::validation("variation name cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tee_payload() -> JsonValue {
        json!({
            "name": "Tee",
            "thumbnail": "tee.png",
            "price": 19.99,
            "quantity": 10,
            "attributes": { "size": "M", "material": "cotton" }
        })
    }

    fn tee_record() -> CatalogRecord {
        let product = NewProduct::from_json(tee_payload()).unwrap();
        CatalogRecord::draft(
            ShopId::new("shop1").unwrap(),
            ProductKind::new("Clothing").unwrap(),
            AttributeId::new(),
            &product,
            Utc::now(),
        )
    }

    #[test]
    fn draft_record_starts_unpublished_with_defaults() {
        let record = tee_record();
        assert!(record.is_draft());
        assert!(!record.is_published());
        assert_eq!(record.rating, DEFAULT_RATING);
        assert_eq!(record.slug, "tee");
        assert_eq!(record.quantity, 10);
        assert_eq!(record.id, ProductId::owning(record.attributes_ref));
        assert_eq!(record.version, 1);
    }

    #[test]
    fn new_product_rejects_missing_required_fields() {
        let mut raw = tee_payload();
        raw.as_object_mut().unwrap().remove("thumbnail");
        match NewProduct::from_json(raw).unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("thumbnail")),
            _ => panic!("Expected Validation error for missing thumbnail"),
        }
    }

    #[test]
    fn new_product_rejects_negative_price_and_quantity() {
        let mut raw = tee_payload();
        raw["price"] = json!(-1.0);
        assert!(NewProduct::from_json(raw).is_err());

        let mut raw = tee_payload();
        raw["quantity"] = json!(-3);
        assert!(NewProduct::from_json(raw).is_err());
    }

    #[test]
    fn new_product_rejects_blank_name() {
        let mut raw = tee_payload();
        raw["name"] = json!("   ");
        match NewProduct::from_json(raw).unwrap_err() {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty name"),
        }
    }

    #[test]
    fn new_product_treats_null_description_as_absent() {
        let mut raw = tee_payload();
        raw["description"] = JsonValue::Null;
        let product = NewProduct::from_json(raw).unwrap();
        assert_eq!(product.description, None);
    }

    #[test]
    fn update_splits_attributes_from_base_fields() {
        let update = ProductUpdate::from_json(json!({
            "name": "Better Tee",
            "price": null,
            "attributes": { "size": "L" }
        }))
        .unwrap();
        assert_eq!(update.base.name.as_deref(), Some("Better Tee"));
        assert_eq!(update.base.price, None);
        assert_eq!(update.attributes, Some(json!({ "size": "L" })));
    }

    #[test]
    fn update_with_only_attributes_has_empty_base_patch() {
        let update = ProductUpdate::from_json(json!({ "attributes": { "size": "L" } })).unwrap();
        assert!(update.base.is_empty());
    }

    #[test]
    fn update_rejects_shop_and_kind_reassignment() {
        assert!(ProductUpdate::from_json(json!({ "shop": "other" })).is_err());
        assert!(ProductUpdate::from_json(json!({ "kind": "Furniture" })).is_err());
    }

    #[test]
    fn update_rejects_non_object_attributes() {
        assert!(ProductUpdate::from_json(json!({ "attributes": "L" })).is_err());
    }

    #[test]
    fn apply_patch_only_touches_given_fields() {
        let mut record = tee_record();
        let before = record.clone();
        let later = before.updated_at + chrono::Duration::seconds(5);

        record.apply_patch(
            &ProductPatch {
                name: Some("Linen Tee".to_string()),
                ..ProductPatch::default()
            },
            later,
        );

        assert_eq!(record.name, "Linen Tee");
        assert_eq!(record.slug, "linen-tee");
        assert_eq!(record.price, before.price);
        assert_eq!(record.thumbnail, before.thumbnail);
        assert_eq!(record.updated_at, later);
        assert_eq!(record.created_at, before.created_at);
        assert_eq!(record.version, before.version + 1);
    }

    #[test]
    fn empty_patch_only_moves_updated_at() {
        let mut record = tee_record();
        let before = record.clone();
        let later = before.updated_at + chrono::Duration::seconds(1);
        record.apply_patch(&ProductPatch::default(), later);

        let mut expected = before;
        expected.updated_at = later;
        expected.version += 1;
        assert_eq!(record, expected);
    }

    #[test]
    fn record_publish_and_unpublish() {
        let mut record = tee_record();
        record.publish(Utc::now()).unwrap();
        assert!(record.is_published());
        assert!(record.publish(Utc::now()).is_err());
        record.unpublish(Utc::now()).unwrap();
        assert!(record.is_draft());
    }

    #[test]
    fn record_json_exposes_state_flags() {
        let mut record = tee_record();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["is_draft"], json!(true));
        assert_eq!(json["is_published"], json!(false));
        assert!(json.get("state").is_none());

        record.publish(Utc::now()).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["is_published"], json!(true));
        let back: CatalogRecord = serde_json::from_value(json).unwrap();
        assert!(back.is_published());
    }

    #[test]
    fn record_json_with_conflicting_flags_is_rejected() {
        let mut json = serde_json::to_value(tee_record()).unwrap();
        json["is_published"] = json!(true);
        assert!(serde_json::from_value::<CatalogRecord>(json).is_err());
    }

    #[test]
    fn slugify_collapses_punctuation_and_case() {
        assert_eq!(slugify("  Linen T-Shirt (Blue)!  "), "linen-t-shirt-blue");
        assert_eq!(slugify("---"), "");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the lifecycle flags are never both set, whatever the transition sequence.
            #[test]
            fn draft_and_published_are_exclusive(ops in prop::collection::vec(any::<bool>(), 0..20)) {
                let mut record = tee_record();
                for publish in ops {
                    let _ = if publish {
                        record.publish(Utc::now())
                    } else {
                        record.unpublish(Utc::now())
                    };
                    prop_assert!(record.is_draft() != record.is_published());
                }
            }

            /// Property: slugs only contain lowercase alphanumerics and single inner hyphens.
            #[test]
            fn slugs_are_url_safe(name in "[A-Za-z0-9 _.!-]{0,40}") {
                let slug = slugify(&name);
                prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
                prop_assert!(!slug.contains("--"));
                prop_assert!(slug.chars().all(|c| c == '-' || c.is_ascii_digit() || c.is_ascii_lowercase()));
            }
        }
    }
}
