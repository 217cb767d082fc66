//! Credential exchange and account sign-up.
//!
//! SYSTEM CONTEXT
//! ==============
//! `/auth/token` trades an email and password for a bearer token;
//! `/auth/signup` creates an account. [`sign_in`] and [`sign_up`] chain these
//! into [`SessionStore::login`], which is how the CLI and any other embedder
//! enter the authenticated state.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::gateway::{ApiRequest, Gateway};
use crate::session::{Role, SessionError, SessionStore, User};

pub const TOKEN_PATH: &str = "/auth/token";
pub const SIGNUP_PATH: &str = "/auth/signup";

/// Successful credential exchange response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

/// New account as `/auth/signup` expects it.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct NewAccount {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Exchange an email and password for a token.
///
/// Rejected credentials are a form error, not a session error: a 401 that
/// carries a `detail` message comes back as [`ApiError::Validation`] with
/// that message.
///
/// # Errors
///
/// Returns an [`ApiError`] for transport failures, rejected credentials, or
/// a response without an `access_token`.
pub async fn exchange_credentials(gateway: &Gateway, email: &str, password: &str) -> Result<AccessToken, ApiError> {
    let request = ApiRequest::post(TOKEN_PATH).form([("username", email), ("password", password)]);
    match gateway.send_json::<AccessToken>(request).await {
        Ok(token) => Ok(token),
        Err(ApiError::Authentication { status: 401, detail: Some(detail), .. }) => {
            tracing::debug!("credential exchange rejected");
            Err(ApiError::Validation { status: 401, messages: vec![detail] })
        }
        Err(e) => Err(e),
    }
}

/// Create an account. Does not sign in.
///
/// # Errors
///
/// Returns an [`ApiError`]; an already-registered email is a
/// [`ApiError::Validation`] carrying the backend's message.
pub async fn register_account(gateway: &Gateway, account: &NewAccount) -> Result<User, ApiError> {
    let request = ApiRequest::post(SIGNUP_PATH).json(account)?;
    gateway.send_json(request).await
}

/// Exchange credentials and log the store in with the issued token.
///
/// A failed exchange leaves the session untouched.
///
/// # Errors
///
/// Returns [`SessionError::Api`] when the exchange fails and the
/// [`SessionStore::login`] errors otherwise.
pub async fn sign_in(store: &SessionStore, email: &str, password: &str) -> Result<User, SessionError> {
    let token = exchange_credentials(store.gateway(), email, password).await?;
    store.login(&token.access_token).await
}

/// Register `account`, then sign in with its credentials.
///
/// # Errors
///
/// Returns [`SessionError::Api`] when registration or the exchange fails and
/// the [`SessionStore::login`] errors otherwise.
pub async fn sign_up(store: &SessionStore, account: &NewAccount) -> Result<User, SessionError> {
    let created = register_account(store.gateway(), account).await?;
    tracing::info!(user_id = created.id, role = %created.role, "account created");
    sign_in(store, &account.email, &account.password).await
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;
