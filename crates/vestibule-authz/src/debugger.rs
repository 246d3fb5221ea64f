//! Per-caller debug logging switches.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use vestibule_core::{RequestDebugger, TokenPayload};

/// Which sides of a request to log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugSides {
    /// Log request body and decoded input.
    pub input: bool,
    /// Log response body.
    pub output: bool,
}

impl DebugSides {
    /// Both sides.
    pub const BOTH: Self = Self {
        input: true,
        output: true,
    };
}

/// Request debugger driven by user ids and logins registered at runtime.
///
/// Tokens whose payload carries the debug flag get both sides unless
/// [`ignore_token_flag`](Self::ignore_token_flag) was called.
#[derive(Debug, Clone)]
pub struct StaticRequestDebugger {
    users: Arc<RwLock<HashMap<i64, DebugSides>>>,
    logins: Arc<RwLock<HashMap<String, DebugSides>>>,
    honor_token_flag: bool,
}

impl Default for StaticRequestDebugger {
    fn default() -> Self {
        Self {
            users: Arc::default(),
            logins: Arc::default(),
            honor_token_flag: true,
        }
    }
}

impl StaticRequestDebugger {
    /// Create a debugger with nobody selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop treating the token debug flag as a request for logging.
    pub fn ignore_token_flag(mut self) -> Self {
        self.honor_token_flag = false;
        self
    }

    /// Enables logging for user `id`.
    pub fn enable_user(&self, id: i64, sides: DebugSides) {
        self.users.write().insert(id, sides);
    }

    /// Enables logging for `login`.
    pub fn enable_login(&self, login: impl Into<String>, sides: DebugSides) {
        self.logins.write().insert(login.into(), sides);
    }

    /// Removes user `id`.
    pub fn disable_user(&self, id: i64) {
        self.users.write().remove(&id);
    }

    /// Removes `login`.
    pub fn disable_login(&self, login: &str) {
        self.logins.write().remove(login);
    }
}

impl RequestDebugger for StaticRequestDebugger {
    fn is_debug_required(&self, payload: &dyn TokenPayload) -> (bool, bool) {
        let mut sides = DebugSides::default();
        if self.honor_token_flag && payload.debug() {
            sides = DebugSides::BOTH;
        }
        for found in [
            self.users.read().get(&payload.user()).copied(),
            self.logins.read().get(payload.login()).copied(),
        ]
        .into_iter()
        .flatten()
        {
            sides.input |= found.input;
            sides.output |= found.output;
        }
        (sides.input, sides.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Payload {
        user: i64,
        login: &'static str,
        debug: bool,
    }

    impl TokenPayload for Payload {
        fn user(&self) -> i64 {
            self.user
        }
        fn login(&self) -> &str {
            self.login
        }
        fn role(&self) -> i64 {
            1
        }
        fn perms(&self) -> &[u8] {
            &[]
        }
        fn debug(&self) -> bool {
            self.debug
        }
    }

    const ALICE: Payload = Payload {
        user: 7,
        login: "alice",
        debug: false,
    };

    #[test]
    fn test_nobody_selected() {
        assert_eq!(StaticRequestDebugger::new().is_debug_required(&ALICE), (false, false));
    }

    #[test]
    fn test_user_and_login_merge() {
        let debugger = StaticRequestDebugger::new();
        debugger.enable_user(7, DebugSides { input: true, output: false });
        debugger.enable_login("alice", DebugSides { input: false, output: true });
        assert_eq!(debugger.is_debug_required(&ALICE), (true, true));

        debugger.disable_login("alice");
        assert_eq!(debugger.is_debug_required(&ALICE), (true, false));
        debugger.disable_user(7);
        assert_eq!(debugger.is_debug_required(&ALICE), (false, false));
    }

    #[test]
    fn test_token_flag() {
        let flagged = Payload { debug: true, ..ALICE };
        assert_eq!(StaticRequestDebugger::new().is_debug_required(&flagged), (true, true));
        assert_eq!(
            StaticRequestDebugger::new()
                .ignore_token_flag()
                .is_debug_required(&flagged),
            (false, false)
        );
    }
}
