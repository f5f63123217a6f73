// Allow dead code: registry extension points are exercised by tests only
#![allow(dead_code)]

//! Sign-in provider dispatch.
//!
//! Each provider name maps to a handler that gets the final say on a
//! sign-in after token issuance succeeds. A provider that is not
//! registered is rejected before any network call is made.

use std::collections::HashMap;

use super::credentials::Credentials;
use super::session::SessionToken;

/// The only provider the console ships with.
pub const CREDENTIALS_PROVIDER: &str = "credentials";

/// Post-issuance gate for one provider.
pub type SignInHandler = fn(&Credentials, &SessionToken) -> bool;

pub struct ProviderRegistry {
    handlers: HashMap<&'static str, SignInHandler>,
}

fn allow_credentials(_credentials: &Credentials, _token: &SessionToken) -> bool {
    true
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        let mut handlers: HashMap<&'static str, SignInHandler> = HashMap::new();
        handlers.insert(CREDENTIALS_PROVIDER, allow_credentials);
        Self { handlers }
    }
}

impl ProviderRegistry {
    /// Register (or replace) a provider's sign-in handler.
    pub fn register(&mut self, name: &'static str, handler: SignInHandler) {
        self.handlers.insert(name, handler);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Run the provider's handler. Unknown providers are rejected.
    pub fn allows_sign_in(
        &self,
        provider: &str,
        credentials: &Credentials,
        token: &SessionToken,
    ) -> bool {
        match self.handlers.get(provider) {
            Some(handler) => handler(credentials, token),
            None => false,
        }
    }
}
