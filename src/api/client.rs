//! HTTP client for the Fomento backend.
//!
//! Covers the two authentication endpoints (token issuance and token
//! verification) plus the authorized-module listing used to build the
//! console menu. All other backend surface is out of scope here.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::{Credentials, TokenBackend, VerifyOutcome};
use crate::models::ModuleList;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds for issuance and data calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Verification runs on every access, so it fails fast: a hung verify
/// call must not hang the enclosing request.
const VERIFY_TIMEOUT_SECS: u64 = 5;

/// Token pair returned by `POST /auth/token`.
///
/// The backend does not always include a refresh token; the field
/// defaults to empty rather than failing the whole sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

/// API client for the Fomento backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client targeting the given backend base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Exchange credentials for a token pair.
    ///
    /// The credentials go out as a URL-encoded form body; any 2xx
    /// response with a parseable token body counts as success.
    pub async fn request_token(&self, credentials: &Credentials) -> Result<TokenPair, ApiError> {
        let url = self.url("/auth/token");

        let response = self.client.post(&url).form(credentials).send().await?;
        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("token response body: {}", e)))
    }

    /// Ask the backend whether an access token is still valid.
    ///
    /// Valid only on an exact 200; any other status is an explicit
    /// rejection. Transport failures are reported as their own outcome
    /// so the caller can decide whether a blip ends the session.
    pub async fn verify_token(&self, access_token: &str) -> VerifyOutcome {
        let url = self.url("/auth/verify-token");

        let result = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .timeout(Duration::from_secs(VERIFY_TIMEOUT_SECS))
            .send()
            .await;

        match result {
            Ok(response) if response.status() == StatusCode::OK => VerifyOutcome::Valid,
            Ok(response) => {
                debug!(status = %response.status(), "verify-token rejected the access token");
                VerifyOutcome::Invalid
            }
            Err(error) => {
                warn!(error = %error, "verify-token transport failure");
                VerifyOutcome::TransportError
            }
        }
    }

    /// Fetch the modules the signed-in user is authorized to use.
    pub async fn fetch_modules(&self, access_token: &str) -> Result<ModuleList, ApiError> {
        let url = self.url("/auth/modules");

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;
        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("module list body: {}", e)))
    }
}

impl TokenBackend for ApiClient {
    async fn request_token(&self, credentials: &Credentials) -> Result<TokenPair, ApiError> {
        ApiClient::request_token(self, credentials).await
    }

    async fn verify_token(&self, access_token: &str) -> VerifyOutcome {
        ApiClient::verify_token(self, access_token).await
    }
}
