//! Gateway error taxonomy and backend error-payload parsing.
//!
//! DESIGN
//! ======
//! Every non-2xx response and transport failure is normalized into one
//! [`ApiError`]. The backend reports problems as `{"detail": ...}` where
//! `detail` is either a string or a list of `{"msg": ...}` objects; both
//! shapes are flattened into a list of messages so callers can show the
//! first one verbatim.

use serde_json::Value;

pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred. Please try again.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Grepable error code and retryable flag for surfaced errors.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Errors produced by [`crate::gateway::Gateway`] calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (unreachable, timeout, reset).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The backend rejected the credential (401) or the role (403).
    ///
    /// `session` is the generation of the session whose bearer the gateway
    /// attached, or `None` when the request went out without one.
    #[error("not authorized (status {status}){}", detail_suffix(.detail.as_deref()))]
    Authentication { status: u16, detail: Option<String>, session: Option<u64> },

    /// A 4xx carrying a structured `detail` payload.
    #[error("request rejected (status {status}): {}", .messages.join("; "))]
    Validation { status: u16, messages: Vec<String> },

    /// Any other non-success status.
    #[error("unexpected response status {status}")]
    Status { status: u16, body: Value },

    /// A success body could not be decoded into the expected type.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The request could not be built (bad header, body encoding).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The caller abandoned the request before it resolved.
    #[error("request cancelled")]
    Cancelled,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

fn detail_suffix(detail: Option<&str>) -> String {
    detail.map(|d| format!(": {d}")).unwrap_or_default()
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "E_TRANSPORT",
            Self::Authentication { .. } => "E_AUTHENTICATION",
            Self::Validation { .. } => "E_VALIDATION",
            Self::Status { .. } => "E_STATUS",
            Self::Decode(_) => "E_DECODE",
            Self::InvalidRequest(_) => "E_INVALID_REQUEST",
            Self::Cancelled => "E_CANCELLED",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

impl ApiError {
    /// Classify a non-success response from its status and raw body.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let payload = parse_payload(body);
        let messages = detail_messages(&payload);

        match status {
            401 | 403 => Self::Authentication { status, detail: messages.into_iter().next(), session: None },
            400..=499 if !messages.is_empty() => Self::Validation { status, messages },
            _ => Self::Status { status, body: payload },
        }
    }

    /// HTTP status carried by the error, if the backend responded at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::Validation { status, .. } | Self::Status { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Tag an authentication failure with the session generation whose token was sent.
    #[must_use]
    pub(crate) fn sent_by_session(self, generation: Option<u64>) -> Self {
        match self {
            Self::Authentication { status, detail, .. } => Self::Authentication { status, detail, session: generation },
            other => other,
        }
    }

    /// Session generation whose token this rejection was for, if one was sent.
    #[must_use]
    pub fn rejected_session(&self) -> Option<u64> {
        match self {
            Self::Authentication { session, .. } => *session,
            _ => None,
        }
    }

    /// `true` for a 401: the credential itself was rejected.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Authentication { status: 401, .. })
    }

    /// Text suitable for showing to an end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { messages, .. } => {
                messages.first().cloned().unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_owned())
            }
            Self::Authentication { detail: Some(detail), .. } => detail.clone(),
            Self::Authentication { detail: None, .. } => SESSION_EXPIRED_MESSAGE.to_owned(),
            _ => GENERIC_FAILURE_MESSAGE.to_owned(),
        }
    }
}

/// Parse a response body as JSON, keeping non-JSON text as a string value.
pub(crate) fn parse_payload(body: &str) -> Value {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_owned()))
}

/// Flatten a `detail` field into its messages.
///
/// `{"detail": "x"}` yields `["x"]`; `{"detail": [{"msg": "a"}, {"msg": "b"}]}`
/// yields `["a", "b"]`. Anything else yields an empty list.
#[must_use]
pub fn detail_messages(payload: &Value) -> Vec<String> {
    match payload.get("detail") {
        Some(Value::String(message)) => vec![message.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(message) => Some(message.clone()),
                Value::Object(fields) => fields.get("msg").and_then(Value::as_str).map(ToOwned::to_owned),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;
