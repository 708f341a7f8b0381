//! Promise-style fetch backend.
//!
//! A [`Fetcher`] resolves to a response whenever the server answered, and
//! fails only on connection-level errors. Status checking happens before the
//! body is parsed; parse and network errors keep their own messages.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;

use super::TransportError;

/// A response as seen by a fetch-style mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    status: u16,
    body: String,
}

impl FetchResponse {
    /// Creates a response from status and body text.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// True for any 2xx status.
    #[must_use]
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Propagated`] with the parser's message.
    pub fn json(&self) -> Result<Value, TransportError> {
        serde_json::from_str(&self.body).map_err(TransportError::propagated)
    }
}

/// Modern request mechanism resolving to a [`FetchResponse`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Sends `GET url` with `Accept: application/json`.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    async fn fetch(&self, url: &str) -> Result<FetchResponse, TransportError>;
}

/// Settles a fetch outcome: non-ok status first, then the body.
pub(crate) fn settle(outcome: Result<FetchResponse, TransportError>) -> Result<Value, TransportError> {
    let response = outcome?;
    if !response.ok() {
        return Err(TransportError::http_status(response.status()));
    }
    response.json()
}

/// [`Fetcher`] backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an existing client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[tracing::instrument(skip(self), fields(backend = "fetch"))]
    async fn fetch(&self, url: &str) -> Result<FetchResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(TransportError::propagated)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(TransportError::propagated)?;
        Ok(FetchResponse { status, body })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fetch_response_ok_range() {
        assert!(FetchResponse::new(200, "").ok());
        assert!(FetchResponse::new(201, "").ok());
        assert!(!FetchResponse::new(0, "").ok());
        assert!(!FetchResponse::new(304, "").ok());
        assert!(!FetchResponse::new(404, "").ok());
    }

    #[test]
    fn test_settle_ok_parses_body() {
        let value = settle(Ok(FetchResponse::new(200, r#"{"download_url":"u"}"#))).unwrap();
        assert_eq!(value, json!({"download_url": "u"}));
    }

    #[test]
    fn test_settle_non_ok_skips_parsing() {
        let err = settle(Ok(FetchResponse::new(503, "not json"))).unwrap_err();
        assert_eq!(err, TransportError::http_status(503));
    }

    #[test]
    fn test_settle_parse_failure_propagates_message() {
        let err = settle(Ok(FetchResponse::new(200, "not json"))).unwrap_err();
        assert!(matches!(err, TransportError::Propagated { .. }));
        assert!(err.to_string().contains("expected"), "got: {err}");
    }

    #[test]
    fn test_settle_network_failure_passes_through() {
        let err = settle(Err(TransportError::propagated("error sending request"))).unwrap_err();
        assert_eq!(err.to_string(), "error sending request");
    }
}
