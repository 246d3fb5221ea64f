//! Structured request bodies.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ExtractionError;

/// Deserializes a JSON body into `T`.
///
/// An empty body is a client error, not a default value.
///
/// ```rust
/// use serde::Deserialize;
/// use vestibule_extract::decode_body;
///
/// #[derive(Debug, Deserialize)]
/// struct NewOrder {
///     sku: String,
///     qty: u32,
/// }
///
/// let order: NewOrder = decode_body(br#"{"sku":"A-1","qty":2}"#).unwrap();
/// assert_eq!(order.qty, 2);
/// assert!(decode_body::<NewOrder>(b"").unwrap_err().is_empty_body());
/// ```
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ExtractionError> {
    if body.is_empty() {
        return Err(ExtractionError::empty_body());
    }
    serde_json::from_slice(body).map_err(ExtractionError::body)
}

/// Deserializes a JSON body over an existing value.
///
/// Object keys present in the body overwrite the matching fields, nested
/// objects merge key by key, and everything the body leaves out keeps its
/// current value. Fields filled from the path or by the controller factory
/// survive.
///
/// The merge goes through [`serde_json::Value`], so integers beyond the
/// `i64`/`u64` range are read as floats.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use vestibule_extract::decode_body_into;
///
/// #[derive(Serialize, Deserialize)]
/// struct Item {
///     name: String,
///     qty: u32,
/// }
///
/// let mut item = Item { name: "widget".into(), qty: 0 };
/// decode_body_into(br#"{"qty":3}"#, &mut item).unwrap();
/// assert_eq!(item.name, "widget");
/// assert_eq!(item.qty, 3);
/// ```
pub fn decode_body_into<T>(body: &[u8], dest: &mut T) -> Result<(), ExtractionError>
where
    T: DeserializeOwned + Serialize,
{
    let patch: Value = decode_body(body)?;
    let merged = match serde_json::to_value(&*dest) {
        Ok(mut current) => {
            merge(&mut current, patch);
            current
        }
        Err(_) => patch,
    };
    *dest = serde_json::from_value(merged).map_err(ExtractionError::body)?;
    Ok(())
}

fn merge(current: &mut Value, patch: Value) {
    match (current, patch) {
        (Value::Object(current), Value::Object(patch)) => {
            for (key, value) in patch {
                match current.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        current.insert(key, value);
                    }
                }
            }
        }
        (slot, patch) => *slot = patch,
    }
}
