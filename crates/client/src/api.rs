//! HTTP client for the Tradepost API.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tradepost_core::{Portal, SessionDescriptor, SessionToken};
use url::Url;

use crate::error::ClientError;

/// Successful login: the token to cache and what it grants.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResult {
    pub token: SessionToken,
    pub session: SessionDescriptor,
}

/// Outcome of asking the API whether a token is still good.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCheck {
    /// The token resolves to this session.
    Valid(SessionDescriptor),
    /// The API definitively refused the token (401 or 403).
    Rejected(u16),
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
    portal: Portal,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Tradepost API client.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: Url) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner { client, base_url }),
        })
    }

    /// The API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Exchange credentials for a session token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 401 for bad credentials.
    #[tracing::instrument(skip(self, password), fields(portal = %portal))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        portal: Portal,
    ) -> Result<LoginResult, ClientError> {
        let response = self
            .inner
            .client
            .post(self.url("/api/auth/login")?)
            .json(&LoginBody {
                email,
                password,
                portal,
            })
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Ask the API whether `token` is still valid.
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures and for statuses other than
    /// success, 401 and 403. Those say nothing about the token.
    #[tracing::instrument(skip_all)]
    pub async fn validate_session(
        &self,
        token: &SessionToken,
    ) -> Result<SessionCheck, ClientError> {
        let response = self
            .inner
            .client
            .get(self.url("/api/auth/session")?)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Ok(SessionCheck::Rejected(response.status().as_u16()))
            }
            _ => Self::handle_response(response).await.map(SessionCheck::Valid),
        }
    }

    /// Revoke `token` on the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is refused.
    #[tracing::instrument(skip_all)]
    pub async fn logout(&self, token: &SessionToken) -> Result<(), ClientError> {
        let response = self
            .inner
            .client
            .post(self.url("/api/auth/logout")?)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::parse_error(response).await)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| ClientError::Parse(format!("Failed to parse response: {e}")));
        }
        Err(Self::parse_error(response).await)
    }

    async fn parse_error(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
