//! Shared fixtures for unit tests.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use wiremock::MockServer;

use crate::config::{ClientConfig, IdentityStrategy};
use crate::session::SessionStore;
use crate::storage::{MemoryTokenStore, TOKEN_KEY, TokenStore};
use crate::token::now_secs;

/// Unsigned JWT carrying `claims` as its payload.
pub fn jwt(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub fn fresh_token(email: &str) -> String {
    jwt(&json!({ "sub": email, "exp": now_secs() + 3600 }))
}

pub fn expired_token(email: &str) -> String {
    jwt(&json!({ "sub": email, "exp": now_secs() - 60 }))
}

/// Identity record as the current-user endpoint returns it.
pub fn doctor_json() -> Value {
    json!({ "id": 1, "email": "a@b.com", "full_name": "A B", "role": "doctor" })
}

pub fn config_for(server: &MockServer, identity: IdentityStrategy) -> ClientConfig {
    ClientConfig::new(&server.uri())
        .unwrap()
        .with_identity_strategy(identity)
}

/// Store against `server` with an empty in-memory token store.
pub fn store_for(server: &MockServer) -> (SessionStore, Arc<MemoryTokenStore>) {
    store_with(server, IdentityStrategy::RemoteVerify, None)
}

pub fn store_with(
    server: &MockServer,
    identity: IdentityStrategy,
    persisted: Option<&str>,
) -> (SessionStore, Arc<MemoryTokenStore>) {
    let storage = Arc::new(MemoryTokenStore::default());
    if let Some(token) = persisted {
        storage.set(TOKEN_KEY, token).unwrap();
    }
    let store = SessionStore::connect(&config_for(server, identity), storage.clone()).unwrap();
    (store, storage)
}
