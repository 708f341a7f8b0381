//! In-memory page host.
//!
//! Holds element state the way a rendered page would, so the controller can
//! run without a browser. The CLI uses it for `--html` output.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::catalog::Book;
use crate::navigate::NavigationError;
use crate::render::{self, PageParts};

use super::host::{BooksContainer, Host, LoadTrigger, StatusText};
use super::{Locale, Messages};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct MemoryStatus {
    text: Mutex<String>,
    error: AtomicBool,
}

impl StatusText for MemoryStatus {
    fn set_text(&self, text: &str) {
        *lock(&self.text) = text.to_string();
    }

    fn set_error(&self, error: bool) {
        self.error.store(error, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
struct MemoryTrigger {
    disabled: AtomicBool,
}

impl LoadTrigger for MemoryTrigger {
    fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
struct MemoryContainer {
    entries: Mutex<Vec<(Book, String)>>,
}

impl BooksContainer for MemoryContainer {
    fn clear(&self) {
        lock(&self.entries).clear();
    }

    fn append(&self, book: &Book, card_html: String) {
        lock(&self.entries).push((book.clone(), card_html));
    }
}

/// A page kept entirely in memory.
#[derive(Debug)]
pub struct MemoryPage {
    messages: Messages,
    status: Option<Arc<MemoryStatus>>,
    trigger: Option<Arc<MemoryTrigger>>,
    container: Option<Arc<MemoryContainer>>,
    alerts: Mutex<Vec<String>>,
    visited: Mutex<Vec<String>>,
    navigation_block: Option<String>,
}

impl MemoryPage {
    /// A page with every element present and the idle status shown.
    #[must_use]
    pub fn new(locale: Locale) -> Self {
        let messages = Messages::new(locale);
        let status = MemoryStatus::default();
        status.set_text(messages.idle());
        Self {
            messages,
            status: Some(Arc::new(status)),
            trigger: Some(Arc::new(MemoryTrigger::default())),
            container: Some(Arc::new(MemoryContainer::default())),
            alerts: Mutex::new(Vec::new()),
            visited: Mutex::new(Vec::new()),
            navigation_block: None,
        }
    }

    /// Removes the status line.
    #[must_use]
    pub fn without_status(mut self) -> Self {
        self.status = None;
        self
    }

    /// Removes the load trigger.
    #[must_use]
    pub fn without_trigger(mut self) -> Self {
        self.trigger = None;
        self
    }

    /// Removes the books container.
    #[must_use]
    pub fn without_container(mut self) -> Self {
        self.container = None;
        self
    }

    /// Makes every navigation fail with `reason`.
    #[must_use]
    pub fn block_navigation(mut self, reason: impl Into<String>) -> Self {
        self.navigation_block = Some(reason.into());
        self
    }

    /// Current status text; empty without a status line.
    #[must_use]
    pub fn status_line(&self) -> String {
        self.status
            .as_ref()
            .map(|status| lock(&status.text).clone())
            .unwrap_or_default()
    }

    /// Whether the status line carries error styling.
    #[must_use]
    pub fn status_is_error(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(|status| status.error.load(Ordering::SeqCst))
    }

    /// Whether the load trigger is disabled.
    #[must_use]
    pub fn trigger_disabled(&self) -> bool {
        self.trigger
            .as_ref()
            .is_some_and(|trigger| trigger.disabled.load(Ordering::SeqCst))
    }

    /// Rendered cards in order.
    #[must_use]
    pub fn cards(&self) -> Vec<String> {
        self.container
            .as_ref()
            .map(|c| lock(&c.entries).iter().map(|(_, html)| html.clone()).collect())
            .unwrap_or_default()
    }

    /// Rendered books in order.
    #[must_use]
    pub fn books(&self) -> Vec<Book> {
        self.container
            .as_ref()
            .map(|c| lock(&c.entries).iter().map(|(book, _)| book.clone()).collect())
            .unwrap_or_default()
    }

    /// Alerts shown so far.
    #[must_use]
    pub fn alerts(&self) -> Vec<String> {
        lock(&self.alerts).clone()
    }

    /// Every URL navigated to, oldest first.
    #[must_use]
    pub fn visited(&self) -> Vec<String> {
        lock(&self.visited).clone()
    }

    /// The current location, if the page ever navigated.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        lock(&self.visited).last().cloned()
    }

    /// Renders the page as a standalone HTML document.
    #[must_use]
    pub fn to_html(&self) -> String {
        let cards = self.cards();
        let status = self.status_line();
        render::page_document(
            &PageParts {
                status: &status,
                status_error: self.status_is_error(),
                trigger_disabled: self.trigger_disabled(),
                cards: &cards,
            },
            &self.messages,
        )
    }
}

#[async_trait]
impl Host for MemoryPage {
    fn status_text(&self) -> Option<Arc<dyn StatusText>> {
        self.status
            .as_ref()
            .map(|status| Arc::clone(status) as Arc<dyn StatusText>)
    }

    fn load_trigger(&self) -> Option<Arc<dyn LoadTrigger>> {
        self.trigger
            .as_ref()
            .map(|trigger| Arc::clone(trigger) as Arc<dyn LoadTrigger>)
    }

    fn books_container(&self) -> Option<Arc<dyn BooksContainer>> {
        self.container
            .as_ref()
            .map(|container| Arc::clone(container) as Arc<dyn BooksContainer>)
    }

    fn alert(&self, message: &str) {
        lock(&self.alerts).push(message.to_string());
    }

    async fn navigate(&self, url: &str) -> Result<(), NavigationError> {
        if let Some(reason) = &self.navigation_block {
            return Err(NavigationError::blocked(reason.clone()));
        }
        debug!(url = %url, "page navigated");
        lock(&self.visited).push(url.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_page_shows_idle_status() {
        let page = MemoryPage::new(Locale::En);
        assert_eq!(page.status_line(), "Press the button to load books.");
        assert!(!page.status_is_error());
        assert!(!page.trigger_disabled());
        assert!(page.cards().is_empty());
    }

    #[test]
    fn test_missing_elements_are_not_found() {
        let page = MemoryPage::new(Locale::En).without_trigger().without_container();
        assert!(page.status_text().is_some());
        assert!(page.load_trigger().is_none());
        assert!(page.books_container().is_none());
    }

    #[test]
    fn test_element_handles_write_through() {
        let page = MemoryPage::new(Locale::En);
        page.status_text().unwrap().set_text("hello");
        page.status_text().unwrap().set_error(true);
        page.load_trigger().unwrap().set_disabled(true);
        assert_eq!(page.status_line(), "hello");
        assert!(page.status_is_error());
        assert!(page.trigger_disabled());
        assert!(page.to_html().contains("hello"));
    }

    #[tokio::test]
    async fn test_blocked_navigation_leaves_location_unset() {
        let page = MemoryPage::new(Locale::En).block_navigation("sandboxed");
        let err = page.navigate("https://x/y").await.unwrap_err();
        assert!(matches!(err, NavigationError::Blocked { .. }));
        assert!(page.location().is_none());
    }
}
