//! Credential comparison.

use tracing::{debug, info};

use crate::config::Credentials;

/// Notice shown after a failed attempt. Never says which field was wrong.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Compares submitted credentials against the configured pair.
#[derive(Debug, Clone)]
pub struct CredentialGate {
    expected: Credentials,
}

impl CredentialGate {
    pub fn new(expected: Credentials) -> Self {
        Self { expected }
    }

    /// Succeeds only when both values match exactly.
    pub fn attempt_login(&self, username: &str, password: &str) -> bool {
        let ok = username == self.expected.username && password == self.expected.password;
        if ok {
            info!(user = %username, "Login accepted");
        } else {
            debug!("Login rejected");
        }
        ok
    }
}
