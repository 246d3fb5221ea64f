//! Property tests for masking.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use vestibule_mask::{FieldKind, FieldMeta, Fields, JsonMask, JsonMasker};

fn fields() -> Fields {
    let element: Fields = [
        FieldMeta::new("token", "-", FieldKind::Scalar),
        FieldMeta::new("note", "", FieldKind::Scalar),
        FieldMeta::new("tag", "unregistered", FieldKind::Scalar),
    ]
    .into_iter()
    .collect();

    [
        FieldMeta::new("id", "", FieldKind::Scalar),
        FieldMeta::new("email", "email", FieldKind::Scalar),
        FieldMeta::new("password", "-", FieldKind::Scalar),
        FieldMeta::new("items", "", FieldKind::Array(element)),
    ]
    .into_iter()
    .collect()
}

fn item() -> impl Strategy<Value = Value> {
    ("[a-z]{0,8}", "[a-z]{0,8}", any::<u32>()).prop_map(|(note, tag, token)| {
        json!({"note": note, "tag": tag, "token": token})
    })
}

fn document() -> impl Strategy<Value = Value> {
    (
        any::<i64>(),
        "[a-z@.]{0,16}",
        proptest::option::of("[ -~]{0,12}"),
        proptest::collection::vec(item(), 0..6),
    )
        .prop_map(|(id, email, password, items)| {
            let mut doc = Map::new();
            doc.insert("id".into(), json!(id));
            doc.insert("email".into(), json!(email));
            if let Some(password) = password {
                doc.insert("password".into(), json!(password));
            }
            doc.insert("items".into(), Value::Array(items));
            Value::Object(doc)
        })
}

proptest! {
    #[test]
    fn masking_is_idempotent(doc in document()) {
        let masker = JsonMask::new().with_func("email", |_| "***".to_string());
        let fields = fields();
        let once = masker.mask(doc.to_string().as_bytes(), &fields).unwrap();
        let twice = masker.mask(&once, &fields).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn deleting_keeps_element_count_and_order(doc in document()) {
        let masker = JsonMask::new();
        let out = masker.mask(doc.to_string().as_bytes(), &fields()).unwrap();
        let out: Value = serde_json::from_slice(&out).unwrap();

        let before = doc["items"].as_array().unwrap();
        let after = out["items"].as_array().unwrap();
        prop_assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(after) {
            prop_assert!(a.get("token").is_none());
            prop_assert_eq!(&b["note"], &a["note"]);
            prop_assert_eq!(&b["tag"], &a["tag"]);
        }
        prop_assert!(out.get("password").is_none());
    }
}
