//! Transient sign-in credentials.
//!
//! A credential bundle is built once from user input, sent to the
//! backend as a URL-encoded form body, and dropped. Nothing here is
//! ever written to disk or to the OS keychain.

use std::fmt;

use serde::Serialize;

/// Tenant domain used when the operator does not specify one.
pub const DEFAULT_DOMAIN: &str = "FOMENTO";

/// One sign-in attempt's worth of credentials.
///
/// Field names match the backend's token form exactly; the struct is
/// serialized verbatim as the `POST /auth/token` body.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub domain: String,
    pub username: String,
    pub password: String,
    /// One-time code from the authenticator app.
    pub client_secret: String,
}

impl Credentials {
    pub fn new(
        domain: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            username: username.into(),
            password: password.into(),
            client_secret: client_secret.into(),
        }
    }
}

// Manual Debug so secrets never reach the logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
