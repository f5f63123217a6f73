// Allow dead code: policy/registry builders are exercised by tests only
#![allow(dead_code)]

//! Session lifecycle management.
//!
//! The manager mediates sign-in, keeps the session record honest across
//! accesses, and gates continued access on backend-verified token
//! validity. Per token lifetime it is a small state machine: freshly
//! issued (one verification-free pass), then active (verified on every
//! access), then terminated (any verification failure; the only way
//! back is a new sign-in).

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiError, TokenPair};

use super::claims::{self, ClaimsError};
use super::credentials::Credentials;
use super::providers::ProviderRegistry;
use super::session::SessionToken;

/// Result of asking the backend about an access token.
///
/// An explicit rejection and a transport failure are distinct outcomes;
/// only the refresh policy decides whether they end the session the
/// same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Backend answered exactly 200.
    Valid,
    /// Backend answered anything else.
    Invalid,
    /// Backend could not be reached at all.
    TransportError,
}

/// The two network calls the manager depends on, as a seam.
pub trait TokenBackend {
    async fn request_token(&self, credentials: &Credentials) -> Result<TokenPair, ApiError>;
    async fn verify_token(&self, access_token: &str) -> VerifyOutcome;
}

/// Sign-in failure taxonomy. Every variant means the same thing to the
/// operator: no session was created.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("unknown sign-in provider: {0}")]
    UnknownProvider(String),

    #[error("credentials rejected: {0}")]
    CredentialRejected(String),

    /// The issuance body or its embedded claims could not be decoded.
    /// Treated exactly like a credential rejection at the boundary.
    #[error("token issuance response was malformed: {0}")]
    MalformedToken(#[from] ClaimsError),

    #[error("token issuance failed: {0}")]
    Transport(#[source] ApiError),
}

/// How refresh reacts to verification outcomes.
#[derive(Debug, Clone, Copy)]
pub struct RefreshPolicy {
    /// Extra verification attempts after a transport failure before the
    /// session is terminated. An explicit rejection is never retried.
    pub transport_retries: u32,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            transport_retries: 1,
        }
    }
}

pub struct SessionManager<B> {
    backend: B,
    providers: ProviderRegistry,
    policy: RefreshPolicy,
}

impl<B: TokenBackend> SessionManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            providers: ProviderRegistry::default(),
            policy: RefreshPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = providers;
        self
    }

    /// Exchange credentials for a freshly-issued session.
    ///
    /// No client-side credential validation happens here; the backend
    /// is the authority. On any failure no session is created and no
    /// existing record is touched.
    pub async fn authenticate(
        &self,
        provider: &str,
        credentials: &Credentials,
    ) -> Result<SessionToken, AuthError> {
        if !self.providers.contains(provider) {
            return Err(AuthError::UnknownProvider(provider.to_string()));
        }

        let pair = match self.backend.request_token(credentials).await {
            Ok(pair) => pair,
            Err(error @ ApiError::NetworkError(_)) => return Err(AuthError::Transport(error)),
            Err(error) => return Err(AuthError::CredentialRejected(error.to_string())),
        };

        let decoded = claims::decode_unverified(&pair.access_token)?;
        let token = SessionToken::issue(pair, decoded);

        if !self.providers.allows_sign_in(provider, credentials, &token) {
            return Err(AuthError::CredentialRejected(format!(
                "sign-in vetoed by the {} provider handler",
                provider
            )));
        }

        info!(sub = %token.sub, is_superuser = token.is_superuser, "session established");
        Ok(token)
    }

    /// Run one access cycle on a stored session.
    ///
    /// A freshly-issued token passes straight through once; after that
    /// every access re-verifies against the backend. `None` means the
    /// session is terminated and the caller must treat the user as
    /// signed out. The token is returned as-is on success - no
    /// rotation, no refresh-token exchange.
    pub async fn refresh(&self, token: SessionToken) -> Option<SessionToken> {
        if token.is_fresh() {
            debug!(sub = %token.sub, "freshly issued session, skipping verification");
            return Some(token.into_active());
        }

        let mut retries_left = self.policy.transport_retries;
        loop {
            match self.backend.verify_token(&token.access_token).await {
                VerifyOutcome::Valid => return Some(token),
                VerifyOutcome::Invalid => {
                    info!(sub = %token.sub, "access token rejected by backend, terminating session");
                    return None;
                }
                VerifyOutcome::TransportError if retries_left > 0 => {
                    retries_left -= 1;
                    warn!(sub = %token.sub, retries_left, "transport failure during verification, retrying");
                }
                VerifyOutcome::TransportError => {
                    warn!(sub = %token.sub, "verification unreachable, terminating session");
                    return None;
                }
            }
        }
    }

    /// Ask the backend about a raw access token.
    pub async fn verify(&self, access_token: &str) -> VerifyOutcome {
        self.backend.verify_token(access_token).await
    }
}
