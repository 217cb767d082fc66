//! Client configuration parsed from environment variables.
//!
//! The base address is the one required value: a missing or malformed URL
//! fails here, at startup, instead of surfacing as a transport error on the
//! first request.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CURRENT_USER_PATH: &str = "/users/me";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const API_URL_VAR: &str = "MULTICARE_API_URL";
pub const IDENTITY_STRATEGY_VAR: &str = "MULTICARE_IDENTITY_STRATEGY";
pub const CURRENT_USER_PATH_VAR: &str = "MULTICARE_CURRENT_USER_PATH";
pub const REQUEST_TIMEOUT_VAR: &str = "MULTICARE_REQUEST_TIMEOUT_SECS";
pub const CONNECT_TIMEOUT_VAR: &str = "MULTICARE_CONNECT_TIMEOUT_SECS";
pub const TOKEN_FILE_VAR: &str = "MULTICARE_TOKEN_FILE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No base address was supplied.
    #[error("missing API base URL: set {var}")]
    MissingBaseUrl { var: &'static str },

    /// The base address is not an absolute http(s) URL.
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// An optional setting was present but unparseable.
    #[error("config parse failed: {0}")]
    Parse(String),
}

/// How a token is turned into an identity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentityStrategy {
    /// Call the current-user endpoint with the token.
    #[default]
    RemoteVerify,
    /// Decode the token payload locally; no network round trip.
    LocalDecode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

impl Timeouts {
    #[must_use]
    pub fn request(self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Absolute backend address without a trailing slash.
    pub base_url: String,
    pub identity: IdentityStrategy,
    pub current_user_path: String,
    pub timeouts: Timeouts,
    /// Overrides the default token file location when set.
    pub token_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Validate `base_url` and build a config with defaults for everything else.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingBaseUrl`] for an empty address and
    /// [`ConfigError::InvalidBaseUrl`] for anything that is not an absolute
    /// `http`/`https` URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            identity: IdentityStrategy::default(),
            current_user_path: DEFAULT_CURRENT_USER_PATH.to_owned(),
            timeouts: Timeouts::default(),
            token_file: None,
        })
    }

    /// Build typed client config from environment variables.
    ///
    /// Required:
    /// - `MULTICARE_API_URL`
    ///
    /// Optional:
    /// - `MULTICARE_IDENTITY_STRATEGY`: `remote` (default) or `local`
    /// - `MULTICARE_CURRENT_USER_PATH`: default `/users/me`
    /// - `MULTICARE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `MULTICARE_CONNECT_TIMEOUT_SECS`: default 10
    /// - `MULTICARE_TOKEN_FILE`: default under the platform config directory
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the base URL is missing or invalid, or
    /// when an optional value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var(API_URL_VAR).unwrap_or_default();
        Self::new(&base_url)?.apply_env()
    }

    /// Overlay the optional environment settings onto an existing config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when a present value cannot be parsed.
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Ok(raw) = std::env::var(IDENTITY_STRATEGY_VAR) {
            self.identity = parse_identity_strategy(&raw)?;
        }
        if let Ok(path) = std::env::var(CURRENT_USER_PATH_VAR) {
            if !path.trim().is_empty() {
                self.current_user_path = path.trim().to_owned();
            }
        }
        self.timeouts = Timeouts {
            request_secs: env_parse_u64(REQUEST_TIMEOUT_VAR, self.timeouts.request_secs)?,
            connect_secs: env_parse_u64(CONNECT_TIMEOUT_VAR, self.timeouts.connect_secs)?,
        };
        if let Ok(path) = std::env::var(TOKEN_FILE_VAR) {
            if !path.trim().is_empty() {
                self.token_file = Some(PathBuf::from(path.trim()));
            }
        }
        Ok(self)
    }

    #[must_use]
    pub fn with_identity_strategy(mut self, identity: IdentityStrategy) -> Self {
        self.identity = identity;
        self
    }

    #[must_use]
    pub fn with_current_user_path(mut self, path: impl Into<String>) -> Self {
        self.current_user_path = path.into();
        self
    }

    #[must_use]
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Join a backend path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{base_url}{path}")
    } else {
        format!("{base_url}/{path}")
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::MissingBaseUrl { var: API_URL_VAR });
    }

    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidBaseUrl { url: raw.to_owned(), reason: e.to_string() })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_owned(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidBaseUrl { url: raw.to_owned(), reason: "missing host".to_owned() });
    }

    Ok(trimmed.to_owned())
}

fn parse_identity_strategy(raw: &str) -> Result<IdentityStrategy, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "remote" | "remote_verify" => Ok(IdentityStrategy::RemoteVerify),
        "local" | "local_decode" => Ok(IdentityStrategy::LocalDecode),
        other => Err(ConfigError::Parse(format!(
            "unsupported {IDENTITY_STRATEGY_VAR} '{other}' (expected 'remote' or 'local')"
        ))),
    }
}

fn env_parse_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::Parse(format!("{key}: {e}"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
