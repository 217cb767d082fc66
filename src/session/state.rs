//! Session snapshot broadcast to every observer.
//!
//! SYSTEM CONTEXT
//! ==============
//! The store publishes a fresh [`Session`] on every transition. Route guards
//! in the embedding application read [`Session::should_redirect_to_login`];
//! the gateway reads [`Session::bearer`] once per request.

use serde::{Deserialize, Serialize};

use crate::token::now_secs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Nurse,
    Admin,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Doctor => "doctor",
            Self::Nurse => "nurse",
            Self::Admin => "admin",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated user's identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "user_id")]
    pub id: i64,
    pub email: String,
    #[serde(rename = "full_name", default)]
    pub display_name: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Store constructed; persisted state not read yet.
    #[default]
    Uninitialized,
    /// A persisted or freshly issued token being turned into an identity.
    Loading,
    Authenticated,
    Anonymous,
}

/// Point-in-time view of the session.
///
/// `user` is only ever set while `token` is set. `token` without `user`
/// means identity resolution is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub phase: SessionPhase,
    pub token: Option<String>,
    pub user: Option<User>,
    /// Decoded `exp` claim of `token`, when the payload carries one.
    pub expires_at: Option<i64>,
    generation: u64,
}

impl Session {
    /// Counter bumped by every store transition.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn bump_generation(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Drop token and identity and settle as anonymous. Generation is kept.
    pub(crate) fn clear(&mut self) {
        self.phase = SessionPhase::Anonymous;
        self.token = None;
        self.user = None;
        self.expires_at = None;
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, SessionPhase::Uninitialized | SessionPhase::Loading)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(now_secs())
    }

    /// `true` when a token is present and not known to be expired at `now`.
    #[must_use]
    pub fn is_authenticated_at(&self, now: i64) -> bool {
        self.token.is_some() && !self.expires_at.is_some_and(|exp| exp <= now)
    }

    /// Settled with no identity: the embedding app should route to login.
    #[must_use]
    pub fn should_redirect_to_login(&self) -> bool {
        !self.is_loading() && self.user.is_none()
    }

    #[must_use]
    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;
