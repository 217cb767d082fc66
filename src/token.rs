//! Local decoding of bearer-token claims.
//!
//! Tokens issued by the backend are JWTs. Only the payload is read; the
//! signature is never checked here, so decoded claims are hints (subject,
//! expiry) and never proof of identity.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use crate::session::{Role, User};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is empty")]
    Empty,
    #[error("token is not a three-part JWT")]
    Malformed,
    #[error("token payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token payload is not JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Claims read from a token payload. Unknown claims are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Claims {
    /// Subject; the backend puts the user's email here.
    pub sub: Option<String>,
    /// Expiry as seconds since the Unix epoch.
    pub exp: Option<i64>,
    pub user_id: Option<i64>,
    pub full_name: Option<String>,
    pub role: Option<Role>,
}

impl Claims {
    /// `true` once `now_secs` has reached the expiry. Tokens without `exp` never expire locally.
    #[must_use]
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now_secs)
    }

    /// Minimal identity from the claims; fields the token does not carry are placeholders.
    #[must_use]
    pub fn to_user(&self) -> User {
        let email = self.sub.clone().unwrap_or_default();
        let display_name = self.full_name.clone().unwrap_or_else(|| email.clone());
        User {
            id: self.user_id.unwrap_or(0),
            email,
            display_name,
            role: self.role.unwrap_or(Role::Unknown),
        }
    }
}

/// Decode the payload segment of a JWT.
///
/// # Errors
///
/// Returns a [`TokenError`] when the token is empty, does not have three
/// segments, or its payload is not base64url-encoded JSON.
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(TokenError::Empty);
    }

    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };
    if payload.is_empty() {
        return Err(TokenError::Malformed);
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Expiry of `token` if its payload decodes and carries `exp`.
#[must_use]
pub fn peek_expiry(token: &str) -> Option<i64> {
    match decode_claims(token) {
        Ok(claims) => claims.exp,
        Err(_) => None,
    }
}

/// Current time as seconds since the Unix epoch.
#[must_use]
pub fn now_secs() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_secs()).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;
