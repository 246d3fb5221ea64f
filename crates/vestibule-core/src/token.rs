//! Access token contracts.

use std::sync::Arc;

use serde_json::{Map, Value};

/// Application payload carried by an access token.
///
/// `perms` is a packed bitset: bit `n` of the set lives in byte `n / 8` at
/// position `n % 8`.
pub trait TokenPayload: Send + Sync {
    /// Numeric user id.
    fn user(&self) -> i64;

    /// User login.
    fn login(&self) -> &str;

    /// Numeric role id.
    fn role(&self) -> i64;

    /// Packed permission bitset.
    fn perms(&self) -> &[u8];

    /// Extra application data.
    fn extra(&self) -> Option<&Value> {
        None
    }

    /// Whether the token requests debug logging.
    fn debug(&self) -> bool {
        false
    }
}

/// Decoded access token.
pub trait Token: Send + Sync {
    /// Registered claims (`exp`, `iat`, ...).
    fn system_payload(&self) -> &Map<String, Value>;

    /// Application payload.
    fn application_payload(&self) -> Arc<dyn TokenPayload>;
}
