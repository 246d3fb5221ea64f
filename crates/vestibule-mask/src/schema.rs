//! Shape descriptions.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use crate::field::{FieldKind, Fields};

/// Describes the serialized shape of a type for masking.
///
/// Leaf types report [`FieldKind::Scalar`]. Structs report
/// [`FieldKind::Object`] with one [`FieldMeta`](crate::FieldMeta) per
/// serialized attribute, and sequences of structs report
/// [`FieldKind::Array`]. The `tag` selects which directive set is read, so
/// one type can carry different rules for different consumers.
///
/// Implement it with `#[derive(Masked)]`, or by hand for types that
/// serialize to a JSON scalar:
///
/// ```
/// use vestibule_mask::{FieldKind, MaskSchema};
///
/// struct Cents(i64);
///
/// impl MaskSchema for Cents {
///     fn mask_kind(_tag: &str) -> FieldKind {
///         FieldKind::Scalar
///     }
/// }
/// ```
pub trait MaskSchema {
    /// Shape of the type under `tag`.
    fn mask_kind(tag: &str) -> FieldKind;
}

/// Object-safe access to a value's masking metadata.
///
/// Blanket-implemented for every [`MaskSchema`] type.
pub trait Maskable {
    /// Fields of the value's top-level object (or of each element when the
    /// value serializes to an array). Empty for scalars.
    fn mask_fields(&self, tag: &str) -> Fields;
}

impl<T: MaskSchema + ?Sized> Maskable for T {
    fn mask_fields(&self, tag: &str) -> Fields {
        T::mask_kind(tag).into_fields()
    }
}

macro_rules! scalar_schema {
    ($($ty:ty),* $(,)?) => {
        $(
            impl MaskSchema for $ty {
                fn mask_kind(_tag: &str) -> FieldKind {
                    FieldKind::Scalar
                }
            }
        )*
    };
}

scalar_schema!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    str,
    String,
    (),
    serde_json::Value,
    serde_json::Number,
);

impl<T: MaskSchema + ?Sized> MaskSchema for &T {
    fn mask_kind(tag: &str) -> FieldKind {
        T::mask_kind(tag)
    }
}

impl<T: MaskSchema + ?Sized> MaskSchema for Box<T> {
    fn mask_kind(tag: &str) -> FieldKind {
        T::mask_kind(tag)
    }
}

impl<T: MaskSchema + ?Sized> MaskSchema for Arc<T> {
    fn mask_kind(tag: &str) -> FieldKind {
        T::mask_kind(tag)
    }
}

impl<T: MaskSchema + ?Sized> MaskSchema for Rc<T> {
    fn mask_kind(tag: &str) -> FieldKind {
        T::mask_kind(tag)
    }
}

impl<T: MaskSchema> MaskSchema for Option<T> {
    fn mask_kind(tag: &str) -> FieldKind {
        T::mask_kind(tag)
    }
}

impl<T: MaskSchema> MaskSchema for [T] {
    fn mask_kind(tag: &str) -> FieldKind {
        FieldKind::array_of(T::mask_kind(tag))
    }
}

impl<T: MaskSchema, const N: usize> MaskSchema for [T; N] {
    fn mask_kind(tag: &str) -> FieldKind {
        FieldKind::array_of(T::mask_kind(tag))
    }
}

impl<T: MaskSchema> MaskSchema for Vec<T> {
    fn mask_kind(tag: &str) -> FieldKind {
        FieldKind::array_of(T::mask_kind(tag))
    }
}

impl<T: MaskSchema> MaskSchema for BTreeSet<T> {
    fn mask_kind(tag: &str) -> FieldKind {
        FieldKind::array_of(T::mask_kind(tag))
    }
}

impl<T: MaskSchema, S> MaskSchema for HashSet<T, S> {
    fn mask_kind(tag: &str) -> FieldKind {
        FieldKind::array_of(T::mask_kind(tag))
    }
}

// Maps have dynamic keys, so their values cannot be addressed by name.
impl<K, V> MaskSchema for BTreeMap<K, V> {
    fn mask_kind(_tag: &str) -> FieldKind {
        FieldKind::Scalar
    }
}

impl<K, V, S> MaskSchema for HashMap<K, V, S> {
    fn mask_kind(_tag: &str) -> FieldKind {
        FieldKind::Scalar
    }
}

impl MaskSchema for serde_json::Map<String, serde_json::Value> {
    fn mask_kind(_tag: &str) -> FieldKind {
        FieldKind::Scalar
    }
}
