//! Field metadata tree.

/// Shape of a serialized attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldKind {
    /// A value the masker does not look into.
    #[default]
    Scalar,
    /// A JSON object with known fields.
    Object(Fields),
    /// A JSON array whose elements are objects with known fields.
    Array(Fields),
}

impl FieldKind {
    /// Nested fields of an object or array, empty for scalars.
    #[must_use]
    pub fn into_fields(self) -> Fields {
        match self {
            Self::Scalar => Fields::new(),
            Self::Object(fields) | Self::Array(fields) => fields,
        }
    }

    /// Nested fields of an object or array.
    #[must_use]
    pub fn fields(&self) -> Option<&Fields> {
        match self {
            Self::Scalar => None,
            Self::Object(fields) | Self::Array(fields) => Some(fields),
        }
    }

    /// Wraps the kind of an element type into an array kind.
    #[must_use]
    pub fn array_of(element: Self) -> Self {
        match element {
            Self::Object(fields) | Self::Array(fields) if !fields.is_empty() => Self::Array(fields),
            _ => Self::Scalar,
        }
    }
}

/// Masking metadata of one serialized attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    /// Serialized attribute name.
    pub name: String,
    /// Masking directive, empty when none.
    pub directive: String,
    /// Attribute shape.
    pub kind: FieldKind,
}

impl FieldMeta {
    /// Creates a field.
    #[must_use]
    pub fn new(name: impl Into<String>, directive: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            directive: directive.into(),
            kind,
        }
    }

    /// Returns true if this field or any nested field carries a directive.
    #[must_use]
    pub fn is_masked(&self) -> bool {
        !self.directive.is_empty() || self.kind.fields().is_some_and(Fields::has_directives)
    }
}

/// Ordered list of fields of one object shape.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fields(Vec<FieldMeta>);

impl Fields {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a field.
    pub fn push(&mut self, field: FieldMeta) {
        self.0.push(field);
    }

    /// Appends every field of `other`, used for flattened members.
    pub fn append(&mut self, other: Fields) {
        self.0.extend(other.0);
    }

    /// Returns the field named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldMeta> {
        self.0.iter().find(|f| f.name == name)
    }

    /// Iterates over the fields.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldMeta> {
        self.0.iter()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if masking with these fields can change a document.
    #[must_use]
    pub fn has_directives(&self) -> bool {
        self.0.iter().any(FieldMeta::is_masked)
    }

    /// Dotted paths of every field carrying a directive, with the directive.
    ///
    /// ```
    /// use vestibule_mask::{FieldKind, FieldMeta, Fields};
    ///
    /// let user: Fields = [FieldMeta::new("email", "email", FieldKind::Scalar)].into_iter().collect();
    /// let fields: Fields = [FieldMeta::new("user", "", FieldKind::Object(user))].into_iter().collect();
    /// assert_eq!(fields.directives(), vec![("user.email".to_string(), "email".to_string())]);
    /// ```
    #[must_use]
    pub fn directives(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.collect_directives("", &mut out);
        out
    }

    fn collect_directives(&self, prefix: &str, out: &mut Vec<(String, String)>) {
        for field in &self.0 {
            let path = if prefix.is_empty() {
                field.name.clone()
            } else {
                format!("{prefix}.{}", field.name)
            };
            if !field.directive.is_empty() {
                out.push((path.clone(), field.directive.clone()));
            }
            if let Some(children) = field.kind.fields() {
                let path = match field.kind {
                    FieldKind::Array(_) => format!("{path}.#"),
                    _ => path,
                };
                children.collect_directives(&path, out);
            }
        }
    }
}

impl FromIterator<FieldMeta> for Fields {
    fn from_iter<I: IntoIterator<Item = FieldMeta>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Fields {
    type Item = FieldMeta;
    type IntoIter = std::vec::IntoIter<FieldMeta>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a FieldMeta;
    type IntoIter = std::slice::Iter<'a, FieldMeta>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(name: &str, directive: &str) -> FieldMeta {
        FieldMeta::new(name, directive, FieldKind::Scalar)
    }

    #[test]
    fn test_array_of_scalars_is_scalar() {
        assert_eq!(FieldKind::array_of(FieldKind::Scalar), FieldKind::Scalar);
        assert_eq!(
            FieldKind::array_of(FieldKind::Object(Fields::new())),
            FieldKind::Scalar
        );
        let inner: Fields = [scalar("a", "")].into_iter().collect();
        assert_eq!(
            FieldKind::array_of(FieldKind::Object(inner.clone())),
            FieldKind::Array(inner)
        );
    }

    #[test]
    fn test_has_directives_looks_into_children() {
        let plain: Fields = [scalar("id", ""), scalar("name", "")].into_iter().collect();
        assert!(!plain.has_directives());

        let nested: Fields = [scalar("typeId", "-")].into_iter().collect();
        let fields: Fields = [
            scalar("id", ""),
            FieldMeta::new("emails", "", FieldKind::Array(nested)),
        ]
        .into_iter()
        .collect();
        assert!(fields.has_directives());
        assert_eq!(
            fields.directives(),
            vec![("emails.#.typeId".to_string(), "-".to_string())]
        );
    }

    #[test]
    fn test_append_keeps_order() {
        let mut fields: Fields = [scalar("id", "")].into_iter().collect();
        fields.append([scalar("email", "email"), scalar("typeId", "-")].into_iter().collect());
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["id", "email", "typeId"]);
        assert_eq!(fields.get("typeId").map(|f| f.directive.as_str()), Some("-"));
    }
}
