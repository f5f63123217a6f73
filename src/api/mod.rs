//! REST API client module for the Fomento backend.
//!
//! This module provides the `ApiClient` for the token issuance and
//! verification endpoints and the authorized-module listing. Bearer
//! token authentication uses the access token held by the session.

pub mod client;
pub mod error;

pub use client::{ApiClient, TokenPair};
pub use error::ApiError;
