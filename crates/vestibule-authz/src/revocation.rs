//! In-memory list of revoked access tokens.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use vestibule_core::RevokeTokenChecker;

const BEARER_PREFIX: &str = "Bearer ";

fn normalize(token: &str) -> &str {
    token.strip_prefix(BEARER_PREFIX).unwrap_or(token).trim()
}

/// Revoked tokens held in memory.
///
/// Cloning shares the underlying list, so a logout handler can revoke
/// through one clone while the dispatcher checks through another.
#[derive(Debug, Clone, Default)]
pub struct RevocationList {
    revoked: Arc<RwLock<HashSet<String>>>,
}

impl RevocationList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `token` as revoked. A `Bearer ` prefix is ignored.
    pub fn revoke(&self, token: &str) {
        let inserted = self.revoked.write().insert(normalize(token).to_string());
        if inserted {
            tracing::debug!(revoked = self.len(), "access token revoked");
        }
    }

    /// Removes `token` from the list. Returns true if it was present.
    pub fn restore(&self, token: &str) -> bool {
        self.revoked.write().remove(normalize(token))
    }

    /// Returns true if `token` is revoked.
    pub fn contains(&self, token: &str) -> bool {
        self.revoked.read().contains(normalize(token))
    }

    /// Number of revoked tokens.
    pub fn len(&self) -> usize {
        self.revoked.read().len()
    }

    /// Returns true if nothing is revoked.
    pub fn is_empty(&self) -> bool {
        self.revoked.read().is_empty()
    }
}

impl RevokeTokenChecker for RevocationList {
    fn is_token_revoked(&self, token: &str) -> anyhow::Result<bool> {
        Ok(self.contains(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoke_and_restore() {
        let list = RevocationList::new();
        assert!(!list.is_token_revoked("abc").unwrap());

        list.revoke("abc");
        assert!(list.is_token_revoked("abc").unwrap());
        assert_eq!(list.len(), 1);

        assert!(list.restore("abc"));
        assert!(!list.restore("abc"));
        assert!(list.is_empty());
    }

    #[test]
    fn test_bearer_prefix_ignored() {
        let list = RevocationList::new();
        list.revoke("Bearer abc");
        assert!(list.contains("abc"));
        assert!(list.contains("Bearer abc"));
    }

    #[test]
    fn test_clones_share_state() {
        let list = RevocationList::new();
        let other = list.clone();
        other.revoke("t1");
        assert!(list.contains("t1"));
    }
}
