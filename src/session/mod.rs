//! Session store: token, identity, and their lifecycle.
//!
//! DESIGN
//! ======
//! The session lives in a `tokio::sync::watch` channel. The store holds the
//! only sender; the gateway and any observers hold receivers. Each
//! transition bumps a generation counter, and identity lookups only commit
//! when the generation they started under is still current, so a logout or
//! newer login always wins over a slow lookup.
//!
//! LIFECYCLE
//! =========
//! ```text
//! UNINITIALIZED -> LOADING -> {AUTHENTICATED, ANONYMOUS}
//! AUTHENTICATED --logout / unauthorized / expired--> ANONYMOUS
//! {ANONYMOUS, AUTHENTICATED} --login--> LOADING
//! LOADING --login ok--> AUTHENTICATED
//! LOADING --login failed--> ANONYMOUS
//! ```
//! Navigation is not performed here; observers route on
//! [`Session::should_redirect_to_login`].

mod credentials;
mod state;

use std::sync::Arc;

use tokio::sync::watch;

pub use credentials::Credentials;
pub use state::{Role, Session, SessionPhase, User};

use crate::config::{ClientConfig, IdentityStrategy};
use crate::error::{ApiError, ErrorCode, GENERIC_FAILURE_MESSAGE, SESSION_EXPIRED_MESSAGE};
use crate::gateway::{ApiRequest, Gateway};
use crate::storage::{StorageError, TOKEN_KEY, TokenStore};
use crate::token::{TokenError, decode_claims, now_secs, peek_expiry};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The current-user lookup failed for a reason other than a rejected token.
    #[error("identity lookup failed: {0}")]
    IdentityResolution(#[source] ApiError),

    /// The token is past its expiry, or the backend rejected it with 401.
    #[error("session token has expired")]
    TokenExpired,

    #[error("session token is invalid: {0}")]
    InvalidToken(#[from] TokenError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// A newer login, logout, or initialize replaced this operation's result.
    #[error("session changed before the operation completed")]
    Superseded,
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::IdentityResolution(_) => "E_IDENTITY_RESOLUTION",
            Self::TokenExpired => "E_TOKEN_EXPIRED",
            Self::InvalidToken(_) => "E_INVALID_TOKEN",
            Self::Storage(_) => "E_STORAGE",
            Self::Api(e) => e.error_code(),
            Self::Superseded => "E_SUPERSEDED",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::IdentityResolution(e) | Self::Api(e) => e.retryable(),
            _ => false,
        }
    }
}

impl SessionError {
    /// Text suitable for showing to an end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::TokenExpired | Self::InvalidToken(_) => SESSION_EXPIRED_MESSAGE.to_owned(),
            Self::Api(e) => e.user_message(),
            Self::IdentityResolution(_) | Self::Storage(_) | Self::Superseded => GENERIC_FAILURE_MESSAGE.to_owned(),
        }
    }
}

/// Owner of the current session.
///
/// `Send + Sync`; share it behind an `Arc` when several tasks need it.
pub struct SessionStore {
    gateway: Gateway,
    storage: Arc<dyn TokenStore>,
    identity: IdentityStrategy,
    current_user_path: String,
    tx: watch::Sender<Session>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("identity", &self.identity)
            .field("current_user_path", &self.current_user_path)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Build an uninitialized store and the gateway bound to its credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn connect(config: &ClientConfig, storage: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let (tx, rx) = watch::channel(Session::default());
        let gateway = Gateway::new(config, Credentials::new(rx))?;
        Ok(Self {
            gateway,
            storage,
            identity: config.identity,
            current_user_path: config.current_user_path.clone(),
            tx,
        })
    }

    /// Gateway that attaches this store's current token.
    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.tx.subscribe())
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.tx.borrow().user.clone()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.tx.borrow().phase
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.tx.borrow().is_loading()
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Rebuild the session from the persisted token.
    ///
    /// No persisted token settles as anonymous and is not an error. Any
    /// failure to turn a persisted token into an identity clears it from
    /// memory and storage.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::TokenExpired`], [`SessionError::InvalidToken`],
    /// or [`SessionError::IdentityResolution`] when the persisted token is
    /// unusable, [`SessionError::Storage`] when storage cannot be read, and
    /// [`SessionError::Superseded`] when another transition finished first.
    pub async fn initialize(&self) -> Result<SessionPhase, SessionError> {
        let persisted = match self.storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "token storage unreadable; session anonymous");
                self.transition(Session::clear);
                return Err(e.into());
            }
        };

        let Some(token) = persisted else {
            self.transition(Session::clear);
            tracing::debug!("no persisted token; session anonymous");
            return Ok(SessionPhase::Anonymous);
        };

        let generation = self.transition(|s| {
            s.phase = SessionPhase::Loading;
            s.token = Some(token.clone());
            s.user = None;
            s.expires_at = peek_expiry(&token);
        });

        match self.resolve_identity(&token).await {
            Ok(user) => {
                let user_id = user.id;
                if !self.commit(generation, |s| {
                    s.phase = SessionPhase::Authenticated;
                    s.user = Some(user);
                }) {
                    return Err(SessionError::Superseded);
                }
                tracing::info!(user_id, "session restored");
                Ok(SessionPhase::Authenticated)
            }
            Err(err) => Err(self.abandon(generation, err)),
        }
    }

    /// Make `token` current and resolve its identity.
    ///
    /// The token is persisted and published before any network call, so the
    /// identity lookup carries it. The session reads as loading until the
    /// lookup settles. On failure the session is left anonymous with nothing
    /// persisted.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidToken`] for an empty token, the
    /// identity errors of [`SessionStore::initialize`], and
    /// [`SessionError::Storage`] when the token cannot be persisted.
    pub async fn login(&self, token: &str) -> Result<User, SessionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::Empty.into());
        }

        self.storage.set(TOKEN_KEY, token)?;
        let generation = self.transition(|s| {
            s.phase = SessionPhase::Loading;
            s.token = Some(token.to_owned());
            s.user = None;
            s.expires_at = peek_expiry(token);
        });

        match self.resolve_identity(token).await {
            Ok(user) => {
                let resolved = user.clone();
                if !self.commit(generation, |s| {
                    s.phase = SessionPhase::Authenticated;
                    s.user = Some(user);
                }) {
                    return Err(SessionError::Superseded);
                }
                tracing::info!(user_id = resolved.id, role = %resolved.role, "session authenticated");
                Ok(resolved)
            }
            Err(err) => Err(self.abandon(generation, err)),
        }
    }

    /// Clear the in-memory session, then evict the persisted token.
    ///
    /// The in-memory clear happens first and cannot fail, so every request
    /// dispatched after this call carries no credential even if the storage
    /// eviction errors.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] when the persisted token cannot be removed.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.transition(Session::clear);
        self.storage.remove(TOKEN_KEY)?;
        tracing::info!("session logged out");
        Ok(())
    }

    /// Log out when `err` shows the current token was rejected (401).
    ///
    /// Only a rejection of the bearer the current session sent counts: a 401
    /// for a token that a later login or logout already replaced, or for a
    /// request that carried no token, leaves the session alone.
    ///
    /// Returns whether the session was invalidated.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] when the persisted token cannot be removed.
    pub fn invalidate_if_unauthorized(&self, err: &ApiError) -> Result<bool, SessionError> {
        if !err.is_unauthorized() {
            return Ok(false);
        }
        let current = {
            let session = self.tx.borrow();
            session.token.is_some() && err.rejected_session() == Some(session.generation())
        };
        if !current {
            tracing::debug!(error = %err, "ignoring 401 for a replaced or absent token");
            return Ok(false);
        }
        tracing::warn!(error = %err, "token rejected by backend; invalidating session");
        self.logout()?;
        Ok(true)
    }

    /// Log out when the current token's decoded expiry has passed.
    ///
    /// Returns whether the session was invalidated.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] when the persisted token cannot be removed.
    pub fn expire_if_stale(&self) -> Result<bool, SessionError> {
        let stale = {
            let session = self.tx.borrow();
            session.token.is_some() && !session.is_authenticated_at(now_secs())
        };
        if !stale {
            return Ok(false);
        }
        tracing::info!("session token expired");
        self.logout()?;
        Ok(true)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    async fn resolve_identity(&self, token: &str) -> Result<User, SessionError> {
        match self.identity {
            IdentityStrategy::LocalDecode => {
                let claims = decode_claims(token)?;
                if claims.is_expired_at(now_secs()) {
                    return Err(SessionError::TokenExpired);
                }
                Ok(claims.to_user())
            }
            IdentityStrategy::RemoteVerify => {
                if peek_expiry(token).is_some_and(|exp| exp <= now_secs()) {
                    return Err(SessionError::TokenExpired);
                }
                let request = ApiRequest::get(self.current_user_path.as_str());
                match self.gateway.send_json::<User>(request).await {
                    Ok(user) => Ok(user),
                    Err(e) if e.is_unauthorized() => Err(SessionError::TokenExpired),
                    Err(e) => Err(SessionError::IdentityResolution(e)),
                }
            }
        }
    }

    /// Apply `update` as a new transition and return its generation.
    fn transition(&self, update: impl FnOnce(&mut Session)) -> u64 {
        let mut generation = 0;
        self.tx.send_modify(|s| {
            generation = s.bump_generation();
            update(s);
        });
        generation
    }

    /// Apply `update` only if no transition happened since `generation`.
    fn commit(&self, generation: u64, update: impl FnOnce(&mut Session)) -> bool {
        self.tx.send_if_modified(|s| {
            if s.generation() != generation {
                return false;
            }
            update(s);
            true
        })
    }

    /// Clear memory and storage after a failed lookup, unless superseded.
    fn abandon(&self, generation: u64, err: SessionError) -> SessionError {
        if !self.commit(generation, Session::clear) {
            tracing::debug!(error = %err, "discarding superseded identity failure");
            return SessionError::Superseded;
        }
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            tracing::warn!(error = %e, "failed to evict rejected token");
        }
        tracing::info!(code = err.error_code(), "session cleared after identity failure");
        err
    }
}
