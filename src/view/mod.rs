//! View controller: drives list, single-book and download flows.
//!
//! The controller owns no element state. It looks elements up through a
//! [`Host`] on every operation, writes status text, renders cards, and hands
//! download links to the host for navigation.
//!
//! # Status phases
//!
//! `Idle -> Loading -> Success | Error`. An error always re-enables the load
//! trigger, and so does a successful list load. Download requests are not
//! de-duplicated: overlapping downloads each write the shared status line and
//! the last one to finish wins.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bookshelf_core::config::{ApiBase, ClientConfig};
//! use bookshelf_core::transport::{HostCapabilities, HttpSettings, Transport};
//! use bookshelf_core::view::{Locale, MemoryPage, ViewController};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new(ApiBase::parse("https://api.example.com/prod")?);
//! let transport = Transport::select(&HostCapabilities::http(HttpSettings::default())?);
//! let page = Arc::new(MemoryPage::new(Locale::En));
//! let controller = ViewController::new(config, transport, page.clone());
//! controller.load_books().await;
//! println!("{}", page.to_html());
//! # Ok(())
//! # }
//! ```

mod host;
mod messages;
mod page;
mod terminal;

pub use host::{BooksContainer, Host, LoadTrigger, StatusText};
pub use messages::{Locale, Messages};
pub use page::MemoryPage;
pub use terminal::TerminalHost;

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::FutureExt;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::catalog::{Book, DownloadLink, is_truthy};
use crate::config::ClientConfig;
use crate::render;
use crate::transport::{Transport, panic_message};

/// Where the status line is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPhase {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A list or single-book request is in flight.
    Loading,
    /// The last operation succeeded.
    Success,
    /// The last operation reported an error.
    Error,
}

/// Result of [`ViewController::load_books`] and [`ViewController::show_book`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Records were rendered.
    Loaded {
        /// Elements in the payload array.
        listed: usize,
        /// Cards actually rendered; falsy elements are skipped.
        rendered: usize,
    },
    /// The payload held no books.
    Empty,
    /// An error was shown in the status line.
    Failed(String),
    /// A required element was missing; the user was alerted.
    Aborted,
}

/// Result of [`ViewController::download_book`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The host followed the link.
    Navigated(String),
    /// An error was shown in the status line.
    Failed(String),
}

struct Elements {
    status: Arc<dyn StatusText>,
    trigger: Arc<dyn LoadTrigger>,
    container: Arc<dyn BooksContainer>,
}

/// Orchestrates requests and renders their results into a [`Host`].
pub struct ViewController {
    config: ClientConfig,
    messages: Messages,
    transport: Transport,
    host: Arc<dyn Host>,
    phase: Mutex<StatusPhase>,
}

impl ViewController {
    /// Creates a controller over explicit configuration, transport and host.
    #[must_use]
    pub fn new(config: ClientConfig, transport: Transport, host: Arc<dyn Host>) -> Self {
        let messages = Messages::new(config.locale);
        Self {
            config,
            messages,
            transport,
            host,
            phase: Mutex::new(StatusPhase::Idle),
        }
    }

    /// Current status phase.
    #[must_use]
    pub fn phase(&self) -> StatusPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The active message catalog.
    #[must_use]
    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    fn set_phase(&self, phase: StatusPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    fn locate(&self) -> Option<Elements> {
        Some(Elements {
            status: self.host.status_text()?,
            trigger: self.host.load_trigger()?,
            container: self.host.books_container()?,
        })
    }

    /// Loads the catalog and renders one card per record.
    #[instrument(skip(self), fields(base = %self.config.api_base))]
    pub async fn load_books(&self) -> LoadOutcome {
        let Some(elements) = self.locate() else {
            return self.abort();
        };
        let url = self.config.api_base.books_url();
        self.guarded(&elements, self.load_list(&elements, &url))
            .await
    }

    /// Loads one book by id and renders it as the only card.
    #[instrument(skip(self), fields(base = %self.config.api_base))]
    pub async fn show_book(&self, id: &str) -> LoadOutcome {
        let Some(elements) = self.locate() else {
            return self.abort();
        };
        if id.is_empty() {
            let text = self.messages.book_id_missing().to_string();
            self.show_error(&elements.status, &text);
            return LoadOutcome::Failed(text);
        }
        let url = self.config.api_base.book_url(&self.config.encoder.encode(id));
        self.guarded(&elements, self.load_single(&elements, &url))
            .await
    }

    /// Resolves a download link for `id` and asks the host to follow it.
    ///
    /// The status line is optional here; without one, errors are only logged.
    #[instrument(skip(self), fields(base = %self.config.api_base))]
    pub async fn download_book(&self, id: &str) -> DownloadOutcome {
        let status = self.host.status_text();

        if id.is_empty() {
            return self.download_error(status.as_ref(), self.messages.book_id_missing().to_string());
        }

        let encoded = self.config.encoder.encode(id);
        let url = self.config.api_base.download_url(&encoded);
        debug!(encoded = %encoded, "requesting download link");

        let payload = match self.transport.get_json(&url).await {
            Ok(payload) => payload,
            Err(error) => {
                return self.download_error(status.as_ref(), self.messages.download_failed(&error));
            }
        };

        let Some(link) = DownloadLink::from_payload(&payload) else {
            return self.download_error(status.as_ref(), self.messages.no_download_link().to_string());
        };
        info!(
            expires_in = ?link.expires_in,
            file_key = ?link.file_key,
            "download link resolved"
        );

        let navigation = AssertUnwindSafe(self.host.navigate(&link.download_url))
            .catch_unwind()
            .await;
        match navigation {
            Ok(Ok(())) => {
                self.set_phase(StatusPhase::Success);
                DownloadOutcome::Navigated(link.download_url)
            }
            Ok(Err(error)) => {
                warn!(error = %error, "navigation failed");
                self.download_error(status.as_ref(), self.messages.redirect_failed().to_string())
            }
            Err(payload) => {
                warn!(message = %panic_message(payload.as_ref()), "navigation panicked");
                self.download_error(status.as_ref(), self.messages.redirect_failed().to_string())
            }
        }
    }

    fn abort(&self) -> LoadOutcome {
        warn!("required page elements missing");
        self.host.alert(self.messages.missing_elements());
        LoadOutcome::Aborted
    }

    /// Runs a flow, turning a panic into a "load exception" status.
    async fn guarded<F>(&self, elements: &Elements, flow: F) -> LoadOutcome
    where
        F: Future<Output = LoadOutcome>,
    {
        match AssertUnwindSafe(flow).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(payload) => {
                let text = self
                    .messages
                    .load_exception(&panic_message(payload.as_ref()));
                warn!(status = %text, "load flow panicked");
                self.show_error(&elements.status, &text);
                elements.trigger.set_disabled(false);
                LoadOutcome::Failed(text)
            }
        }
    }

    fn begin_loading(&self, elements: &Elements) {
        self.set_phase(StatusPhase::Loading);
        elements.status.set_text(self.messages.loading());
        elements.status.set_error(false);
        elements.trigger.set_disabled(true);
    }

    fn show_error(&self, status: &Arc<dyn StatusText>, text: &str) {
        self.set_phase(StatusPhase::Error);
        status.set_text(text);
        status.set_error(true);
    }

    fn show_empty(&self, elements: &Elements) -> LoadOutcome {
        self.set_phase(StatusPhase::Success);
        elements.status.set_text(self.messages.no_books());
        elements.trigger.set_disabled(false);
        LoadOutcome::Empty
    }

    fn download_error(&self, status: Option<&Arc<dyn StatusText>>, text: String) -> DownloadOutcome {
        warn!(status = %text, "download flow failed");
        match status {
            Some(status) => self.show_error(status, &text),
            None => self.set_phase(StatusPhase::Error),
        }
        DownloadOutcome::Failed(text)
    }

    /// Fetches `url` after entering the loading phase; on failure shows the
    /// error and re-enables the trigger.
    async fn fetch_for_load(&self, elements: &Elements, url: &str) -> Result<Value, LoadOutcome> {
        self.begin_loading(elements);
        match self.transport.get_json(url).await {
            Ok(payload) => Ok(payload),
            Err(error) => {
                let text = self.messages.load_failed(&error);
                self.show_error(&elements.status, &text);
                elements.trigger.set_disabled(false);
                Err(LoadOutcome::Failed(text))
            }
        }
    }

    fn render_card(&self, elements: &Elements, record: &Value) {
        let book = Book::from_value(record, &self.messages.placeholders());
        let card = render::book_card(&book, &self.messages);
        elements.container.append(&book, card);
    }

    async fn load_list(&self, elements: &Elements, url: &str) -> LoadOutcome {
        let payload = match self.fetch_for_load(elements, url).await {
            Ok(payload) => payload,
            Err(outcome) => return outcome,
        };

        elements.container.clear();
        let records = match payload.as_array() {
            Some(records) if !records.is_empty() => records,
            _ => return self.show_empty(elements),
        };

        self.set_phase(StatusPhase::Success);
        elements.status.set_text(&self.messages.loaded(records.len()));
        let mut rendered = 0;
        for record in records.iter().filter(|record| is_truthy(record)) {
            self.render_card(elements, record);
            rendered += 1;
        }
        elements.trigger.set_disabled(false);
        info!(listed = records.len(), rendered, "books rendered");

        LoadOutcome::Loaded {
            listed: records.len(),
            rendered,
        }
    }

    async fn load_single(&self, elements: &Elements, url: &str) -> LoadOutcome {
        let payload = match self.fetch_for_load(elements, url).await {
            Ok(payload) => payload,
            Err(outcome) => return outcome,
        };

        elements.container.clear();
        if !payload.is_object() {
            return self.show_empty(elements);
        }

        self.set_phase(StatusPhase::Success);
        elements.status.set_text(&self.messages.loaded(1));
        self.render_card(elements, &payload);
        elements.trigger.set_disabled(false);

        LoadOutcome::Loaded {
            listed: 1,
            rendered: 1,
        }
    }
}
