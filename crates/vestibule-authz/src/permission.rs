//! Permission name to bit position table.

use indexmap::IndexMap;
use serde::Deserialize;
use vestibule_core::PermissionManager;

use crate::error::{AuthzError, AuthzResult};

/// Fixed table of permission names and their bit positions.
///
/// Positions must stay stable for the lifetime of issued tokens, so the
/// table is built once at startup and never mutated afterwards.
///
/// # Example
///
/// ```
/// use vestibule_authz::PermissionTable;
/// use vestibule_core::PermissionManager;
///
/// let table = PermissionTable::sequential(["orders:read", "orders:write"]).unwrap();
/// assert_eq!(table.permission_bit_pos("orders:write"), Some(1));
/// assert_eq!(table.permission_bit_pos("orders:delete"), None);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "IndexMap<String, u32>")]
pub struct PermissionTable {
    positions: IndexMap<String, u32>,
}

impl TryFrom<IndexMap<String, u32>> for PermissionTable {
    type Error = AuthzError;

    fn try_from(map: IndexMap<String, u32>) -> Result<Self, Self::Error> {
        let mut table = Self::new();
        for (name, pos) in map {
            table.insert(name, pos)?;
        }
        Ok(table)
    }
}

impl PermissionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns positions 0, 1, 2, ... in iteration order.
    pub fn sequential<I, S>(names: I) -> AuthzResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (pos, name) in (0u32..).zip(names) {
            table.insert(name, pos)?;
        }
        Ok(table)
    }

    /// Parses a JSON object of `name: position` pairs.
    pub fn from_json(doc: &str) -> AuthzResult<Self> {
        let map: IndexMap<String, u32> = serde_json::from_str(doc)?;
        Self::try_from(map)
    }

    /// Registers `name` at `position`.
    pub fn insert(&mut self, name: impl Into<String>, position: u32) -> AuthzResult<()> {
        let name = name.into();
        if self.positions.contains_key(&name) {
            return Err(AuthzError::duplicate(name));
        }
        if let Some((existing, _)) = self.positions.iter().find(|(_, &p)| p == position) {
            return Err(AuthzError::PositionTaken {
                position,
                name,
                existing: existing.clone(),
            });
        }
        tracing::trace!(permission = %name, position, "permission registered");
        self.positions.insert(name, position);
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, position: u32) -> AuthzResult<Self> {
        self.insert(name, position)?;
        Ok(self)
    }

    /// Registered names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.positions.keys().map(String::as_str)
    }

    /// Number of registered permissions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl PermissionManager for PermissionTable {
    fn permission_bit_pos(&self, name: &str) -> Option<u32> {
        self.positions.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_rejected() {
        let err = PermissionTable::sequential(["a", "b", "a"]).unwrap_err();
        assert!(matches!(err, AuthzError::DuplicatePermission { ref name } if name == "a"));
    }

    #[test]
    fn test_position_conflict_rejected() {
        let err = PermissionTable::new()
            .with("orders:read", 3)
            .unwrap()
            .with("orders:write", 3)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "bit position 3 of permission orders:write is already used by orders:read"
        );
    }

    #[test]
    fn test_from_json() {
        let table = PermissionTable::from_json(r#"{"users:read": 4, "users:write": 12}"#).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.permission_bit_pos("users:write"), Some(12));
        assert_eq!(table.names().collect::<Vec<_>>(), ["users:read", "users:write"]);
    }

    #[test]
    fn test_deserialize_validates() {
        let err = serde_json::from_str::<PermissionTable>(r#"{"a": 1, "b": 1}"#).unwrap_err();
        assert!(err.to_string().contains("already used"));
    }
}
