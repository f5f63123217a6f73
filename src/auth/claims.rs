//! Access-token claim extraction.
//!
//! The backend signs its JWTs; this client never checks the signature.
//! Trust comes from the token-issuance response itself and from the
//! backend's verify endpoint on later accesses, so decoding here only
//! needs to read the payload segment.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims this client reads out of an access token.
///
/// `is_superuser` is optional in the wire payload; older backend builds
/// omit it for regular accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject - set to the username.
    pub sub: String,
    /// Expiry as epoch seconds.
    pub exp: i64,
    #[serde(default)]
    pub is_superuser: bool,
}

#[derive(Error, Debug)]
pub enum ClaimsError {
    #[error("token is not a three-segment JWT")]
    MalformedToken,

    #[error("token payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("token payload is not a valid claims object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode the payload segment of a JWT without verifying its signature.
pub fn decode_unverified(token: &str) -> Result<AccessClaims, ClaimsError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_header), Some(payload), Some(_signature), None) => payload,
        _ => return Err(ClaimsError::MalformedToken),
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload)?;
    Ok(serde_json::from_slice(&bytes)?)
}


#[cfg(test)]
mod tests {
    use super::testing::fake_jwt;
    use super::*;

    #[test]
    fn test_decode_valid_token() {
        let token = fake_jwt("alice", 1_900_000_000, true);
        let claims = decode_unverified(&token).expect("decode failed");
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp, 1_900_000_000);
        assert!(claims.is_superuser);
    }

    #[test]
    fn test_is_superuser_defaults_to_false() {
        let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"bob","exp":1900000000}"#);
        let token = format!("h.{}.s", payload);
        let claims = decode_unverified(&token).expect("decode failed");
        assert!(!claims.is_superuser);
    }

    #[test]
    fn test_rejects_wrong_segment_count() {
        assert!(matches!(
            decode_unverified("only-one-segment"),
            Err(ClaimsError::MalformedToken)
        ));
        assert!(matches!(
            decode_unverified("two.segments"),
            Err(ClaimsError::MalformedToken)
        ));
        assert!(matches!(
            decode_unverified("a.b.c.d"),
            Err(ClaimsError::MalformedToken)
        ));
    }

    #[test]
    fn test_rejects_bad_base64_payload() {
        assert!(matches!(
            decode_unverified("header.!!!not-base64!!!.sig"),
            Err(ClaimsError::Base64(_))
        ));
    }

    #[test]
    fn test_rejects_non_claims_payload() {
        let payload = URL_SAFE_NO_PAD.encode(r#"["not","an","object"]"#);
        let token = format!("h.{}.s", payload);
        assert!(matches!(
            decode_unverified(&token),
            Err(ClaimsError::Json(_))
        ));
    }
}
