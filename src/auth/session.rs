//! The durable session record.
//!
//! A `SessionToken` is created once at sign-in by copying claims out of
//! the decoded access token, then carried across invocations by the
//! session store. It is either present (subject to backend
//! verification on every access) or absent (signed out); there is no
//! in-between state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::claims::AccessClaims;
use crate::api::TokenPair;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    pub access_token: String,
    /// Stored alongside the access token but never exchanged; the
    /// backend's refresh flow is not wired up.
    pub refresh_token: String,
    /// Expiry claim of the access token, epoch seconds. Copied at
    /// issue time and never recomputed.
    pub exp: i64,
    pub sub: String,
    pub is_superuser: bool,
    /// When this session was established by sign-in.
    pub created_at: DateTime<Utc>,
    /// Last time the record was saved after a successful cycle.
    pub updated_at: DateTime<Utc>,
    /// Set at issue time; consumed by the first refresh so that the
    /// second and later accesses always verify against the backend.
    #[serde(default)]
    pub(crate) fresh: bool,
}

/// The session shape handed to callers: the full record, tokens
/// included. Callers need the raw access token for bearer calls and
/// `is_superuser` for gating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub access_token: String,
    pub refresh_token: String,
    pub exp: i64,
    pub sub: String,
    pub is_superuser: bool,
}

impl SessionToken {
    /// Build a freshly-issued session from a token pair and its decoded
    /// claims.
    pub fn issue(pair: TokenPair, claims: AccessClaims) -> Self {
        let now = Utc::now();
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            exp: claims.exp,
            sub: claims.sub,
            is_superuser: claims.is_superuser,
            created_at: now,
            updated_at: now,
            fresh: true,
        }
    }

    /// Whether this token was just issued and is exempt from the next
    /// verification pass.
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Consume the freshness marker. Every later access verifies.
    pub(crate) fn into_active(mut self) -> Self {
        self.fresh = false;
        self
    }

    /// Record a successful cycle so the access window slides forward.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Absolute ceiling: the session dies this long after sign-in
    /// regardless of activity.
    pub fn is_beyond_max_age(&self, max_age: Duration) -> bool {
        Utc::now() > self.created_at + max_age
    }

    /// Sliding window: the session requires a fresh sign-in if it has
    /// not completed a cycle within this long.
    pub fn is_outside_access_window(&self, window: Duration) -> bool {
        Utc::now() > self.updated_at + window
    }

    /// Seconds until the access token's own expiry claim (for display).
    pub fn seconds_until_claim_expiry(&self) -> i64 {
        self.exp - Utc::now().timestamp()
    }

    /// Project the externally visible session shape.
    pub fn project(&self) -> SessionView {
        SessionView {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            exp: self.exp,
            sub: self.sub.clone(),
            is_superuser: self.is_superuser,
        }
    }
}
