//! JSON masking.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::MaskError;
use crate::field::{FieldKind, Fields};
use crate::schema::Maskable;
use crate::DELETE;

/// Registered masking function: receives the attribute's current value as a
/// string and returns the replacement.
pub type MaskFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Computes masking metadata and applies it to serialized JSON.
pub trait JsonMasker: Send + Sync {
    /// Masking metadata of `value` under `tag`.
    fn fields(&self, value: &dyn Maskable, tag: &str) -> Fields {
        value.mask_fields(tag)
    }

    /// Returns a masked copy of `buf`. `buf` itself is left untouched.
    fn mask(&self, buf: &[u8], fields: &Fields) -> Result<Vec<u8>, MaskError>;
}

/// [`JsonMasker`] with a table of named masking functions.
#[derive(Clone, Default)]
pub struct JsonMask {
    funcs: HashMap<String, MaskFn>,
}

impl fmt::Debug for JsonMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.funcs.keys().collect();
        names.sort();
        f.debug_struct("JsonMask").field("funcs", &names).finish()
    }
}

impl JsonMask {
    /// Creates a masker without functions; only `"-"` has an effect.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `f` under `name`, replacing any previous function.
    pub fn add_func<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.funcs.insert(name.into(), Arc::new(f));
    }

    /// Builder form of [`add_func`](Self::add_func).
    #[must_use]
    pub fn with_func<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.add_func(name, f);
        self
    }

    /// Returns true if a function is registered under `name`.
    #[must_use]
    pub fn has_func(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    /// Masks an already parsed document in place.
    pub fn mask_value(&self, value: &mut Value, fields: &Fields) {
        match value {
            Value::Object(map) => self.mask_object(map, fields),
            Value::Array(items) => {
                for item in items {
                    self.mask_value(item, fields);
                }
            }
            _ => {}
        }
    }

    fn mask_object(&self, map: &mut Map<String, Value>, fields: &Fields) {
        for field in fields {
            match field.directive.as_str() {
                "" => {}
                DELETE => {
                    map.shift_remove(&field.name);
                    continue;
                }
                name => {
                    if let (Some(f), Some(current)) = (self.funcs.get(name), map.get_mut(&field.name)) {
                        *current = Value::String(f(&plain_string(current)));
                        continue;
                    }
                }
            }

            if let FieldKind::Object(children) | FieldKind::Array(children) = &field.kind {
                if let Some(nested) = map.get_mut(&field.name) {
                    self.mask_value(nested, children);
                }
            }
        }
    }
}

/// The document is parsed into a [`serde_json::Value`] and written back.
/// Integers outside the `i64`/`u64` range come out as floats in the logged
/// copy; the response body is never affected.
impl JsonMasker for JsonMask {
    fn mask(&self, buf: &[u8], fields: &Fields) -> Result<Vec<u8>, MaskError> {
        let mut doc: Value = serde_json::from_slice(buf).map_err(MaskError::InvalidJson)?;
        self.mask_value(&mut doc, fields);
        serde_json::to_vec(&doc).map_err(MaskError::Write)
    }
}

/// String seen by masking functions: strings unquoted, null empty, anything
/// else as compact JSON.
fn plain_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldMeta;
    use serde_json::json;

    fn masker() -> JsonMask {
        JsonMask::new().with_func("email", |_| "***".to_string())
    }

    fn scalar(name: &str, directive: &str) -> FieldMeta {
        FieldMeta::new(name, directive, FieldKind::Scalar)
    }

    fn mask_json(fields: &Fields, doc: &Value) -> Value {
        let out = masker().mask(doc.to_string().as_bytes(), fields).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn test_oversized_integer_is_logged_as_float() {
        let fields: Fields = [scalar("email", "email")].into_iter().collect();
        let buf = br#"{"n":123456789012345678901234567890,"email":"a@b.c"}"#;
        let out: Value = serde_json::from_slice(&masker().mask(buf, &fields).unwrap()).unwrap();
        assert!(out["n"].is_f64());
        assert!((out["n"].as_f64().unwrap() - 1.234_567_890_123_456_8e29).abs() < 1e14);
        assert_eq!(out["email"], "***");
    }

    #[test]
    fn test_flat_object() {
        let fields: Fields = [
            scalar("id", ""),
            scalar("name", "name"),
            scalar("email", "email"),
            scalar("notice", "-"),
            scalar("document", ""),
        ]
        .into_iter()
        .collect();

        let out = mask_json(
            &fields,
            &json!({
                "id": 0,
                "name": "Robert",
                "email": "robert@example.com",
                "notice": "this is long text",
                "document": "passport"
            }),
        );

        assert_eq!(
            out,
            json!({"id": 0, "name": "Robert", "email": "***", "document": "passport"})
        );
    }

    #[test]
    fn test_nested_object() {
        let user: Fields = [scalar("firstName", "-"), scalar("email", "email")]
            .into_iter()
            .collect();
        let fields: Fields = [scalar("id", ""), FieldMeta::new("user", "", FieldKind::Object(user))]
            .into_iter()
            .collect();

        let out = mask_json(
            &fields,
            &json!({"id": 1, "user": {"firstName": "Robert", "email": "r@example.com"}}),
        );
        assert_eq!(out, json!({"id": 1, "user": {"email": "***"}}));
    }

    #[test]
    fn test_delete_from_every_array_element() {
        let email: Fields = [scalar("email", "email"), scalar("typeId", "-"), scalar("isDefault", "")]
            .into_iter()
            .collect();
        let fields: Fields = [scalar("id", ""), FieldMeta::new("emails", "", FieldKind::Array(email))]
            .into_iter()
            .collect();

        let out = mask_json(
            &fields,
            &json!({"id": 2, "emails": [
                {"email": "a@example.com", "typeId": 1, "isDefault": false},
                {"email": "b@example.com", "typeId": 2, "isDefault": true}
            ]}),
        );
        assert_eq!(
            out,
            json!({"id": 2, "emails": [
                {"email": "***", "isDefault": false},
                {"email": "***", "isDefault": true}
            ]})
        );
    }

    #[test]
    fn test_delete_whole_array_attribute() {
        let fields: Fields = [scalar("id", ""), scalar("perms", "-")].into_iter().collect();
        let out = mask_json(&fields, &json!({"id": 5, "perms": ["Hello", "World"]}));
        assert_eq!(out, json!({"id": 5}));
    }

    #[test]
    fn test_root_array() {
        let fields: Fields = [scalar("secret", "-")].into_iter().collect();
        let out = mask_json(&fields, &json!([{"a": 1, "secret": 2}, {"a": 3}]));
        assert_eq!(out, json!([{"a": 1}, {"a": 3}]));
    }

    #[test]
    fn test_unknown_directive_is_noop() {
        let fields: Fields = [scalar("phone", "mobile")].into_iter().collect();
        let out = mask_json(&fields, &json!({"phone": "909090"}));
        assert_eq!(out, json!({"phone": "909090"}));
    }

    #[test]
    fn test_function_skips_missing_attribute() {
        let fields: Fields = [scalar("email", "email")].into_iter().collect();
        let out = mask_json(&fields, &json!({"id": 1}));
        assert_eq!(out, json!({"id": 1}));
    }

    #[test]
    fn test_function_sees_non_string_values_as_json() {
        let masker = JsonMask::new().with_func("len", |s| s.len().to_string());
        let fields: Fields = [scalar("n", "len"), scalar("obj", "len")].into_iter().collect();
        let out = masker
            .mask(br#"{"n":12345,"obj":{"a":1}}"#, &fields)
            .unwrap();
        assert_eq!(out, br#"{"n":"5","obj":"7"}"#);
    }

    #[test]
    fn test_source_buffer_untouched_and_order_kept() {
        let src = br#"{"z":1,"secret":2,"a":3}"#.to_vec();
        let fields: Fields = [scalar("secret", "-")].into_iter().collect();
        let out = masker().mask(&src, &fields).unwrap();
        assert_eq!(out, br#"{"z":1,"a":3}"#);
        assert_eq!(src, br#"{"z":1,"secret":2,"a":3}"#);
    }

    #[test]
    fn test_invalid_json() {
        let err = masker().mask(b"{not json", &Fields::new()).unwrap_err();
        assert!(matches!(err, MaskError::InvalidJson(_)));
    }

    #[test]
    fn test_debug_lists_function_names() {
        let debug = format!("{:?}", masker().with_func("card", |_| String::new()));
        assert!(debug.contains("card"));
        assert!(debug.contains("email"));
    }
}
