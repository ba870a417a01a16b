//! Bearer token handling.
//!
//! The client cannot verify the token signature, it only reads the `exp`
//! claim to decide when to fetch a new one. Anything that cannot be read is
//! treated as expired.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, Validation};
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct ExpClaim {
    exp: f64,
}

/// Returns `true` when `token` is missing, unreadable, or its `exp` is at or
/// before the current time.
pub fn is_token_expired(token: Option<&str>) -> bool {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return true;
    };
    match expiration(token) {
        Some(exp) => now_secs() >= exp,
        None => true,
    }
}

/// Reads the `exp` claim without verifying the signature.
///
/// NumericDate may carry a fractional part, so the claim is read as `f64`.
pub fn expiration(token: &str) -> Option<f64> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    // jsonwebtoken only counts integer `exp` as present; `ExpClaim` enforces it instead.
    validation.required_spec_claims.clear();

    jsonwebtoken::decode::<ExpClaim>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims.exp)
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Body posted to the token endpoint.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub grant_type: &'static str,
    pub client_id: &'static str,
    pub username: &'a str,
    pub password: &'a str,
}

/// Whatever the token endpoint answered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    #[serde(default, alias = "token")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Cached bearer token.
///
/// `lock` hands out the guard so a caller can check and refresh while other
/// callers wait, instead of each issuing its own token request.
#[derive(Debug, Default)]
pub(crate) struct TokenCache {
    token: Mutex<Option<String>>,
}

impl TokenCache {
    pub fn lock(&self) -> MutexGuard<'_, Option<String>> {
        self.token.lock()
    }

    pub fn get(&self) -> Option<String> {
        self.token.lock().clone()
    }
}
