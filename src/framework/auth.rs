//! Opaque credentials handed to the transport on every request.
//!
//! The entity layer never inspects these; it only forwards them.

use std::fmt;

/// Credential handle supplied when a [`Session`](crate::lifecycle::Session) is built.
#[derive(Clone, PartialEq, Eq)]
pub struct Authentication {
    principal: String,
    secret: String,
}

impl Authentication {
    pub fn new(principal: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            secret: secret.into(),
        }
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authentication")
            .field("principal", &self.principal)
            .field("secret", &"<redacted>")
            .finish()
    }
}
