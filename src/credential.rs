//! Opaque API credential
//!
//! The token is owned by the embedding application session and passed
//! explicitly into the gateway; nothing in this crate stores it globally
//! or persists it. When any gateway call reports `Unauthorized`, the
//! application is expected to drop its `Credential` and return to an
//! unauthenticated state.

use std::fmt;

/// An opaque bearer token for the remote document service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

// Keep the token out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_token() {
        let credential = Credential::new("super-secret");
        assert_eq!(format!("{:?}", credential), "Credential(***)");
    }
}
