//! # multicare
//!
//! Client-side session lifecycle and authenticated request pipeline for the
//! Multicare hospital backend.
//!
//! ARCHITECTURE
//! ============
//! - [`session::SessionStore`] owns the current token and identity, persists
//!   the token through a [`storage::TokenStore`], and broadcasts every
//!   transition over a `watch` channel.
//! - [`gateway::Gateway`] is the single chokepoint for HTTP calls. It reads
//!   the current token through a read-only [`session::Credentials`] handle
//!   and attaches it per request.
//! - [`auth`] performs credential exchange and sign-up; [`api`] holds the
//!   typed data-access calls (patients, beds, appointments, prescriptions,
//!   documents).
//!
//! Navigation is left to the embedding application: it watches the session
//! and routes to its login entry point when [`session::Session::should_redirect_to_login`]
//! becomes true.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod session;
pub mod storage;
pub mod token;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::{ClientConfig, ConfigError, IdentityStrategy};
pub use error::{ApiError, ErrorCode};
pub use gateway::{ApiRequest, Gateway, MultipartForm, RequestBody};
pub use session::{Credentials, Role, Session, SessionError, SessionPhase, SessionStore, User};
pub use storage::{FileTokenStore, MemoryTokenStore, StorageError, TOKEN_KEY, TokenStore};
