//! Unverified JWT payload decoding.
//!
//! The dashboards only read display fields out of the token the backend
//! issued. Malformed tokens decode to nothing; callers degrade to an empty
//! display value rather than erroring.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

/// Claims the dashboards read for display.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenClaims {
    #[serde(default, rename = "displayName")]
    pub display_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub email: String,
}

/// Decode the payload segment of `token`. Returns `None` for anything that
/// is not a three-segment JWT with a base64url JSON object payload.
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return None,
    };
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Build an unsigned token with the given payload, for tests only.
#[cfg(test)]
pub(crate) fn fake_jwt(payload: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
    format!("{header}.{body}.sig")
}
