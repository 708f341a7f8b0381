//! Callback-style exchange backend.
//!
//! An [`Exchanger`] reports only the terminal state of a request: the raw
//! status and body, or a failure with no status at all. The adapter settles
//! that state into JSON or a [`TransportError`] with [`settle`].

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::debug;

use super::TransportError;

/// Terminal state of a request that produced a status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status; `0` for local or opaque responses.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl RawResponse {
    /// Creates a raw response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Terminal state of a request that never produced a status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeFailure {
    /// The request could not be issued.
    Send(String),
    /// The request was issued but the connection failed.
    Network(String),
}

/// Low-level request mechanism reporting `(status, body)`.
#[async_trait]
pub trait Exchanger: Send + Sync {
    /// Sends `GET url` with `Accept: application/json`.
    async fn exchange(&self, url: &str) -> Result<RawResponse, ExchangeFailure>;
}

/// Settles an exchange into the adapter contract.
///
/// `200` and `0` are success and the body must parse as JSON. Any other
/// nonzero status is an HTTP error. A failure without status is a network
/// error, unless the request was never sent.
pub(crate) fn settle(outcome: Result<RawResponse, ExchangeFailure>) -> Result<Value, TransportError> {
    match outcome {
        Ok(RawResponse { status: 200 | 0, body }) => {
            serde_json::from_str(&body).map_err(|e| TransportError::parse_failed(e.to_string()))
        }
        Ok(RawResponse { status, .. }) => Err(TransportError::http_status(status)),
        Err(ExchangeFailure::Send(detail)) => Err(TransportError::send_failed(detail)),
        Err(ExchangeFailure::Network(detail)) => Err(TransportError::network(detail)),
    }
}

/// [`Exchanger`] backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpExchanger {
    client: Client,
}

impl HttpExchanger {
    /// Wraps an existing client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Exchanger for HttpExchanger {
    #[tracing::instrument(skip(self), fields(backend = "exchange"))]
    async fn exchange(&self, url: &str) -> Result<RawResponse, ExchangeFailure> {
        let request = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .build()
            .map_err(|e| ExchangeFailure::Send(e.to_string()))?;

        let response = self.client.execute(request).await.map_err(|e| {
            if e.is_builder() {
                ExchangeFailure::Send(e.to_string())
            } else {
                ExchangeFailure::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeFailure::Network(e.to_string()))?;
        debug!(status, bytes = body.len(), "exchange settled");
        Ok(RawResponse { status, body })
    }
}
