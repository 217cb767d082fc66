//! Authenticated request gateway.
//!
//! DESIGN
//! ======
//! Every backend call goes through [`Gateway::send`]. The bearer header is
//! computed per request from the token current at dispatch time, so a logout
//! never alters headers already sent and every later request carries none.
//! Caller-supplied `Authorization` headers are dropped: the session is the
//! only credential source. Authentication failures remember which session
//! generation supplied the bearer, so a late 401 for a replaced token cannot
//! end the session that replaced it.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses are classified by [`ApiError::from_response`];
//! connection failures and timeouts become [`ApiError::Transport`]. Nothing
//! is retried here.

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::{ClientConfig, join_url};
use crate::error::ApiError;
use crate::session::Credentials;

#[derive(Debug, Clone)]
pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl Gateway {
    /// Build the HTTP client for `config`, reading tokens through `credentials`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the TLS backend cannot be initialised.
    pub fn new(config: &ClientConfig, credentials: Credentials) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;

        Ok(Self { http, base_url: config.base_url.clone(), credentials })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Dispatch `request` and return the JSON body of a 2xx response.
    ///
    /// An empty success body yields `Value::Null`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for transport failures, non-2xx statuses,
    /// unbuildable requests, and success bodies that are not JSON.
    pub async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let ApiRequest { method, path, query, headers, body } = request;
        let url = join_url(&self.base_url, &path);

        let mut builder = self.http.request(method.clone(), &url);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        for (name, value) in &headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::InvalidRequest(format!("header name '{name}': {e}")))?;
            if name == AUTHORIZATION {
                tracing::debug!(%path, "dropping caller-supplied authorization header");
                continue;
            }
            let value =
                HeaderValue::from_str(value).map_err(|e| ApiError::InvalidRequest(format!("header '{name}': {e}")))?;
            builder = builder.header(name, value);
        }
        let mut sent_by = None;
        if let Some((token, generation)) = self.credentials.bearer_with_generation() {
            builder = builder.bearer_auth(token);
            sent_by = Some(generation);
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Form(fields) => builder.form(&fields),
            RequestBody::Multipart(form) => builder.multipart(form.into_reqwest()?),
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                ApiError::InvalidRequest(e.to_string())
            } else {
                tracing::warn!(%method, %path, error = %e, "request transport failure");
                ApiError::Transport(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| ApiError::Transport(e.to_string()))?;

        if !(200..300).contains(&status) {
            tracing::debug!(%method, %path, status, "request rejected");
            return Err(ApiError::from_response(status, &text).sent_by_session(sent_by));
        }
        tracing::debug!(%method, %path, status, "request ok");

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// [`Gateway::send`] followed by decoding the body into `T`.
    ///
    /// # Errors
    ///
    /// As [`Gateway::send`], plus [`ApiError::Decode`] when the body does not match `T`.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let value = self.send(request).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// [`Gateway::send`], abandoned as soon as `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Cancelled`] when cancelled first, otherwise as [`Gateway::send`].
    pub async fn send_until(&self, request: ApiRequest, cancel: &CancellationToken) -> Result<Value, ApiError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ApiError::Cancelled),
            result = self.send(request) => result,
        }
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// One backend call: method, path relative to the base URL, and body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: RequestBody,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), headers: Vec::new(), body: RequestBody::Empty }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Extra request header. `Authorization` is ignored at send time.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// JSON body from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] when `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    #[must_use]
    pub fn json_value(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// URL-encoded form body.
    #[must_use]
    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = RequestBody::Form(fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    #[must_use]
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn body(&self) -> &RequestBody {
        &self.body
    }
}

/// Body encodings the backend accepts.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Content type the body is sent with. Multipart adds its boundary at send time.
    #[must_use]
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Empty => None,
            Self::Json(_) => Some("application/json"),
            Self::Form(_) => Some("application/x-www-form-urlencoded"),
            Self::Multipart(_) => Some("multipart/form-data"),
        }
    }
}

// =============================================================================
// MULTIPART
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    fields: Vec<(String, String)>,
    files: Vec<FilePart>,
}

#[derive(Debug, Clone)]
pub struct FilePart {
    pub name: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((name.into(), value.to_string()));
        self
    }

    #[must_use]
    pub fn file(self, name: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.push_file(FilePart { name: name.into(), file_name: file_name.into(), content_type: None, bytes })
    }

    #[must_use]
    pub fn file_with_type(
        self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.push_file(FilePart {
            name: name.into(),
            file_name: file_name.into(),
            content_type: Some(content_type.into()),
            bytes,
        })
    }

    fn push_file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    #[must_use]
    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    fn into_reqwest(self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for file in self.files {
            let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name);
            if let Some(mime) = file.content_type {
                part = part
                    .mime_str(&mime)
                    .map_err(|e| ApiError::InvalidRequest(format!("content type '{mime}': {e}")))?;
            }
            form = form.part(file.name, part);
        }
        Ok(form)
    }
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;
