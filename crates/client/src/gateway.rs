//! Messaging gateway client.
//!
//! The gateway is an HTTP relay in front of WhatsApp. It takes
//! `POST { "phone", "message", "replyTo"? }` and answers 2xx on acceptance;
//! a refusal may carry an `error` field.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tradepost_core::OrderMessage;
use url::Url;

const GENERIC_FAILURE: &str = "the messaging service could not deliver your message";
const UNREACHABLE: &str = "the messaging service could not be reached";

/// Errors from the messaging gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Network failure or timeout.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("gateway returned {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Rejected {
        status: u16,
        /// The `error` field of the response body, if any.
        message: Option<String>,
    },

    /// The gateway could not be configured.
    #[error("gateway configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Human-readable reason: the gateway's own text when it gave one.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Rejected { message: None, .. } | Self::Config(_) => GENERIC_FAILURE.to_string(),
            Self::Http(_) => UNREACHABLE.to_string(),
        }
    }
}

/// Something that can deliver an [`OrderMessage`].
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Submit `message` once.
    ///
    /// # Errors
    ///
    /// Returns an error for any transport failure or non-success answer.
    async fn send(&self, message: &OrderMessage) -> Result<(), GatewayError>;
}

#[derive(Deserialize)]
struct GatewayErrorBody {
    error: Option<String>,
}

/// HTTP messaging gateway.
#[derive(Clone)]
pub struct HttpGateway {
    inner: Arc<HttpGatewayInner>,
}

struct HttpGatewayInner {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpGateway {
    /// Create a gateway client posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(
        endpoint: Url,
        token: Option<&SecretString>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| GatewayError::Config(format!("Invalid gateway token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpGatewayInner { client, endpoint }),
        })
    }
}

#[async_trait]
impl MessagingGateway for HttpGateway {
    #[tracing::instrument(skip_all, fields(endpoint = %self.inner.endpoint))]
    async fn send(&self, message: &OrderMessage) -> Result<(), GatewayError> {
        let response = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response
            .json::<GatewayErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .filter(|e| !e.trim().is_empty());
        tracing::warn!(status = status.as_u16(), error = ?message, "Gateway refused message");

        Err(GatewayError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("endpoint", &self.inner.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use axum::{
        Json, Router,
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::post,
    };
    use serde_json::{Value, json};

    use super::*;

    type Received = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    async fn serve(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        Url::parse(&format!("http://{addr}/send")).unwrap()
    }

    fn message() -> OrderMessage {
        OrderMessage {
            recipient_phone: "+263771234567".to_string(),
            body: "Hi".to_string(),
            reply_to: None,
        }
    }

    #[tokio::test]
    async fn test_accepted_message_posts_gateway_body() {
        let received: Received = Arc::default();
        let router = Router::new()
            .route(
                "/send",
                post(
                    |State(received): State<Received>,
                     headers: HeaderMap,
                     Json(body): Json<Value>| async move {
                        let auth = headers
                            .get("authorization")
                            .map(|v| v.to_str().unwrap().to_string());
                        received.lock().unwrap().push((auth, body));
                        StatusCode::OK
                    },
                ),
            )
            .with_state(received.clone());
        let url = serve(router).await;

        let token = SecretString::from("gw-secret");
        let gateway = HttpGateway::new(url, Some(&token), Duration::from_secs(5)).unwrap();
        gateway.send(&message()).await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0.as_deref(), Some("Bearer gw-secret"));
        assert_eq!(
            received[0].1,
            json!({ "phone": "+263771234567", "message": "Hi" })
        );
    }

    #[tokio::test]
    async fn test_gateway_error_text_is_surfaced() {
        let router = Router::new().route(
            "/send",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "number is not on WhatsApp" })),
                )
            }),
        );
        let gateway = HttpGateway::new(serve(router).await, None, Duration::from_secs(5)).unwrap();

        let err = gateway.send(&message()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected { status: 400, .. }));
        assert_eq!(err.reason(), "number is not on WhatsApp");
    }

    #[tokio::test]
    async fn test_failure_without_body_uses_generic_reason() {
        let router = Router::new().route("/send", post(|| async { StatusCode::BAD_GATEWAY }));
        let gateway = HttpGateway::new(serve(router).await, None, Duration::from_secs(5)).unwrap();

        let err = gateway.send(&message()).await.unwrap_err();
        assert_eq!(err.reason(), GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn test_unreachable_gateway() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{addr}/send")).unwrap();
        let gateway = HttpGateway::new(url, None, Duration::from_secs(2)).unwrap();

        let err = gateway.send(&message()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Http(_)));
        assert_eq!(err.reason(), UNREACHABLE);
    }
}
