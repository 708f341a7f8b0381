//! Transport adapter for catalog requests.
//!
//! A [`Transport`] issues one unauthenticated GET and completes exactly once
//! with a decoded JSON value or a [`TransportError`]. It picks a backend once,
//! from the [`HostCapabilities`] it is built with:
//!
//! - [`Exchanger`] - low-level mechanism reporting `(status, body)`; preferred
//!   because constrained hosts (e-reader browsers) often lack anything newer
//! - [`Fetcher`] - promise-style mechanism; used only when no exchanger exists
//! - neither - every request fails with [`TransportError::Unsupported`]
//!
//! # Example
//!
//! ```no_run
//! use bookshelf_core::transport::{HostCapabilities, HttpSettings, Transport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let caps = HostCapabilities::http(HttpSettings::default())?;
//! let transport = Transport::select(&caps);
//! let books = transport.get_json("https://api.example.com/prod/books").await?;
//! println!("{books}");
//! # Ok(())
//! # }
//! ```

mod error;
mod exchange;
mod fetch;
mod http_client;

pub use error::TransportError;
pub use exchange::{ExchangeFailure, Exchanger, HttpExchanger, RawResponse};
pub use fetch::{FetchResponse, Fetcher, HttpFetcher};
pub use http_client::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS, DOWNLOAD_STALL_TIMEOUT_SECS, HttpSettings,
    build_download_client, build_http_client,
};

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::TransportPreference;

/// Request mechanisms a host offers.
#[derive(Clone, Default)]
pub struct HostCapabilities {
    exchanger: Option<Arc<dyn Exchanger>>,
    fetcher: Option<Arc<dyn Fetcher>>,
}

impl HostCapabilities {
    /// A host with no network access.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// A host offering both mechanisms over one shared reqwest client.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::SendFailed`] when the client cannot be built.
    pub fn http(settings: HttpSettings) -> Result<Self, TransportError> {
        let client = build_http_client(settings)?;
        Ok(Self::none()
            .with_exchanger(Arc::new(HttpExchanger::new(client.clone())))
            .with_fetcher(Arc::new(HttpFetcher::new(client))))
    }

    /// Adds an exchange-style mechanism.
    #[must_use]
    pub fn with_exchanger(mut self, exchanger: Arc<dyn Exchanger>) -> Self {
        self.exchanger = Some(exchanger);
        self
    }

    /// Adds a fetch-style mechanism.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Hides mechanisms the preference rules out.
    #[must_use]
    pub fn restrict(mut self, preference: TransportPreference) -> Self {
        match preference {
            TransportPreference::Auto => {}
            TransportPreference::Exchange => self.fetcher = None,
            TransportPreference::Fetch => self.exchanger = None,
        }
        self
    }
}

impl fmt::Debug for HostCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostCapabilities")
            .field("exchanger", &self.exchanger.is_some())
            .field("fetcher", &self.fetcher.is_some())
            .finish()
    }
}

/// Which backend a [`Transport`] settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Callback-style exchange.
    Exchange,
    /// Promise-style fetch.
    Fetch,
    /// No mechanism available.
    Unsupported,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exchange => "exchange",
            Self::Fetch => "fetch",
            Self::Unsupported => "unsupported",
        })
    }
}

#[derive(Clone)]
enum Backend {
    Exchange(Arc<dyn Exchanger>),
    Fetch(Arc<dyn Fetcher>),
    Unsupported,
}

/// Single-request JSON transport with a backend fixed at construction.
#[derive(Clone)]
pub struct Transport {
    backend: Backend,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("kind", &self.kind())
            .finish()
    }
}

impl Transport {
    /// Picks the exchanger if present, else the fetcher, else nothing.
    #[must_use]
    pub fn select(capabilities: &HostCapabilities) -> Self {
        let backend = if let Some(exchanger) = &capabilities.exchanger {
            Backend::Exchange(Arc::clone(exchanger))
        } else if let Some(fetcher) = &capabilities.fetcher {
            Backend::Fetch(Arc::clone(fetcher))
        } else {
            Backend::Unsupported
        };
        let transport = Self { backend };
        debug!(kind = %transport.kind(), "transport selected");
        transport
    }

    /// The backend this transport uses.
    #[must_use]
    pub fn kind(&self) -> TransportKind {
        match self.backend {
            Backend::Exchange(_) => TransportKind::Exchange,
            Backend::Fetch(_) => TransportKind::Fetch,
            Backend::Unsupported => TransportKind::Unsupported,
        }
    }

    /// Issues `GET url` and resolves to the decoded body.
    ///
    /// A panic inside the backend is caught and returned as
    /// [`TransportError::Exception`].
    ///
    /// # Errors
    ///
    /// Returns the normalized [`TransportError`] for the selected backend.
    #[tracing::instrument(skip(self), fields(kind = %self.kind()))]
    pub async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        match AssertUnwindSafe(self.dispatch(url)).catch_unwind().await {
            Ok(outcome) => {
                if let Err(error) = &outcome {
                    debug!(error = ?error, "request failed");
                }
                outcome
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(message = %message, "request backend panicked");
                Err(TransportError::exception(message))
            }
        }
    }

    /// Issues `GET url` on a spawned task and hands the outcome to `callback`.
    ///
    /// The callback runs exactly once and never on the caller's stack.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn request<F>(&self, url: impl Into<String>, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<Value, TransportError>) + Send + 'static,
    {
        let transport = self.clone();
        let url = url.into();
        tokio::spawn(async move {
            let outcome = transport.get_json(&url).await;
            callback(outcome);
        })
    }

    async fn dispatch(&self, url: &str) -> Result<Value, TransportError> {
        match &self.backend {
            Backend::Exchange(exchanger) => exchange::settle(exchanger.exchange(url).await),
            Backend::Fetch(fetcher) => fetch::settle(fetcher.fetch(url).await),
            Backend::Unsupported => Err(TransportError::Unsupported),
        }
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
