//! Async HTTP client for the Save the Plate REST backend, plus the pieces of
//! the role dashboards that live between requests: polling and the
//! navigation shell.

pub mod auth;
pub mod dashboard;
pub mod donations;
pub mod error;
pub mod notifications;
pub mod orphanage;
pub mod partners;
pub mod poller;
pub mod profile;
pub mod shell;

pub use error::ApiError;
pub use poller::Poller;
pub use shell::Shell;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use saveplate_types::api::MessageResponse;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Handle to the backend. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(base)?;
        Ok(Self {
            http: reqwest::Client::new(),
            base: parsed.as_str().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Server root, without a trailing slash. Uploaded files are served from here.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base, path.trim_start_matches('/'))
    }

    fn public(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.endpoint(path))
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::MissingToken)?;
        Ok(self.public(method, path).bearer_auth(token))
    }

    /// Send an authenticated request and decode a 2xx body as `T`.
    ///
    /// Error bodies are searched for a `message` field; `fallback` is used
    /// when there is none. A 401 is [`ApiError::Unauthorized`].
    async fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        exchange(req, fallback, true).await
    }

    /// Like [`send`](Self::send) for calls made without a session, where a
    /// 401 is an ordinary rejection (wrong password).
    async fn send_public<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        exchange(req, fallback, false).await
    }

    /// For calls whose only useful answer is a confirmation text.
    async fn send_message(
        &self,
        req: RequestBuilder,
        fallback: &str,
    ) -> Result<Option<String>, ApiError> {
        let resp: MessageResponse = self.send(req, fallback).await?;
        Ok(resp.message)
    }
}

async fn exchange<T: DeserializeOwned>(
    req: RequestBuilder,
    fallback: &str,
    session_bound: bool,
) -> Result<T, ApiError> {
    let resp = req.send().await?;
    let status = resp.status();
    let path = resp.url().path().to_string();
    let body = resp.bytes().await?;
    debug!(%path, status = status.as_u16(), bytes = body.len(), "api response");

    if session_bound && status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
        let message = serde_json::from_slice::<MessageResponse>(&body)
            .ok()
            .and_then(|m| m.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string());
        return Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_slice(b"{}")?);
    }
    Ok(serde_json::from_slice(&body)?)
}
