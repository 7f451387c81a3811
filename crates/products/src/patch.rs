//! Partial-update plumbing: null sanitization and dotted-path field patches.
//!
//! Attribute documents differ per kind, so attribute updates are expressed as a
//! [`FieldPatch`]: a map from dotted paths (`dimensions.width`) to leaf values. Applying
//! one touches only the addressed leaves, so a nested object in an update never replaces
//! its whole parent.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use storefront_core::{DomainError, DomainResult};

/// Remove every null-valued object entry, recursively.
///
/// Array elements are left untouched: position is meaningful inside arrays.
pub fn strip_nulls(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => JsonValue::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Leaf-level update keyed by dotted path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldPatch(BTreeMap<String, JsonValue>);

impl FieldPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a JSON object into dotted paths.
    ///
    /// Nested objects are descended into; scalars and arrays are leaves. Nulls are
    /// dropped, and an empty nested object contributes nothing.
    pub fn flatten(value: &JsonValue) -> DomainResult<Self> {
        let JsonValue::Object(map) = value else {
            return Err(DomainError::validation("partial update must be a JSON object"));
        };
        let mut out = BTreeMap::new();
        flatten_into(&mut out, None, map)?;
        Ok(Self(out))
    }

    /// Serialize a typed patch (absent fields skipped) and flatten it.
    pub fn from_typed<T: Serialize>(patch: &T) -> DomainResult<Self> {
        let value = serde_json::to_value(patch)
            .map_err(|e| DomainError::validation(format!("unserializable patch: {e}")))?;
        Self::flatten(&value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, path: &str) -> Option<&JsonValue> {
        self.0.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Write every leaf into `doc`, creating intermediate objects as needed.
    ///
    /// Fails without modifying `doc` if a path runs through a non-object value.
    pub fn apply_to(&self, doc: &mut JsonValue) -> DomainResult<()> {
        let mut staged = doc.clone();
        for (path, value) in &self.0 {
            set_path(&mut staged, path, value.clone())?;
        }
        *doc = staged;
        Ok(())
    }
}

fn flatten_into(
    out: &mut BTreeMap<String, JsonValue>,
    prefix: Option<&str>,
    map: &Map<String, JsonValue>,
) -> DomainResult<()> {
    for (key, value) in map {
        if key.is_empty() || key.contains('.') {
            return Err(DomainError::validation(format!(
                "field name '{key}' cannot be empty or contain '.'"
            )));
        }
        let path = match prefix {
            Some(p) => format!("{p}.{key}"),
            None => key.clone(),
        };
        match value {
            JsonValue::Null => {}
            JsonValue::Object(nested) => flatten_into(out, Some(&path), nested)?,
            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
    Ok(())
}

fn set_path(doc: &mut JsonValue, path: &str, value: JsonValue) -> DomainResult<()> {
    let mut segments = path.split('.').peekable();
    let mut cursor = doc;
    while let Some(segment) = segments.next() {
        let JsonValue::Object(map) = cursor else {
            return Err(DomainError::validation(format!(
                "path '{path}' runs through a non-object field"
            )));
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return Ok(());
        }
        cursor = map
            .entry(segment.to_string())
            .or_insert_with(|| JsonValue::Object(Map::new()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strip_nulls_removes_nested_nulls_but_keeps_array_slots() {
        let cleaned = strip_nulls(json!({
            "name": null,
            "price": 10,
            "attributes": { "size": null, "material": "wool" },
            "tags": [null, "a"]
        }));
        assert_eq!(
            cleaned,
            json!({
                "price": 10,
                "attributes": { "material": "wool" },
                "tags": [null, "a"]
            })
        );
    }

    #[test]
    fn flatten_produces_dotted_paths() {
        let patch = FieldPatch::flatten(&json!({
            "material": "oak",
            "dimensions": { "width": 1.5, "depth": { "inner": 2 } }
        }))
        .unwrap();
        let paths: Vec<&str> = patch.paths().collect();
        assert_eq!(paths, vec!["dimensions.depth.inner", "dimensions.width", "material"]);
    }

    #[test]
    fn flatten_rejects_non_objects_and_dotted_keys() {
        assert!(FieldPatch::flatten(&json!("size")).is_err());
        assert!(FieldPatch::flatten(&json!({ "a.b": 1 })).is_err());
    }

    #[test]
    fn apply_touches_only_addressed_leaves() {
        let mut doc = json!({
            "material": "oak",
            "dimensions": { "width": 1.0, "height": 2.0, "depth": 0.5 }
        });
        let patch = FieldPatch::flatten(&json!({ "dimensions": { "width": 1.25 } })).unwrap();
        patch.apply_to(&mut doc).unwrap();
        assert_eq!(
            doc,
            json!({
                "material": "oak",
                "dimensions": { "width": 1.25, "height": 2.0, "depth": 0.5 }
            })
        );
    }

    #[test]
    fn apply_through_a_scalar_fails_and_leaves_doc_untouched() {
        let mut doc = json!({ "size": "M", "material": "cotton" });
        let before = doc.clone();
        let patch = FieldPatch::flatten(&json!({ "brand": "acme", "size": { "eu": 40 } })).unwrap();
        assert!(patch.apply_to(&mut doc).is_err());
        assert_eq!(doc, before);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn leaf() -> impl Strategy<Value = JsonValue> {
            prop_oneof![
                any::<bool>().prop_map(JsonValue::from),
                any::<i64>().prop_map(JsonValue::from),
                "[a-z]{0,8}".prop_map(JsonValue::from),
            ]
        }

        fn doc() -> impl Strategy<Value = JsonValue> {
            let nested = prop::collection::btree_map("[a-z]{1,6}", leaf(), 0..4)
                .prop_map(|m| JsonValue::Object(m.into_iter().collect()));
            prop::collection::btree_map("[a-z]{1,6}", prop_oneof![leaf(), nested], 0..6)
                .prop_map(|m| JsonValue::Object(m.into_iter().collect()))
        }

        proptest! {
            /// Property: every leaf of a document is addressed by exactly one path.
            #[test]
            fn flatten_never_emits_objects_or_nulls(value in doc()) {
                let patch = FieldPatch::flatten(&value).unwrap();
                for path in patch.paths() {
                    let leaf = patch.get(path).unwrap();
                    prop_assert!(!leaf.is_object());
                    prop_assert!(!leaf.is_null());
                }
            }

            /// Property: applying a patch is idempotent.
            #[test]
            fn apply_is_idempotent(base in doc(), update in doc()) {
                let patch = FieldPatch::flatten(&update).unwrap();
                let mut once = base.clone();
                if patch.apply_to(&mut once).is_ok() {
                    let mut twice = once.clone();
                    patch.apply_to(&mut twice).unwrap();
                    prop_assert_eq!(once, twice);
                }
            }
        }
    }
}
