//! Element handles the view controller drives.
//!
//! A host plays the part of the page: it may or may not expose each required
//! element, shows alerts, and follows download links.

use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::Book;
use crate::navigate::NavigationError;

/// The status line.
pub trait StatusText: Send + Sync {
    /// Replaces the visible text.
    fn set_text(&self, text: &str);
    /// Turns error styling on or off.
    fn set_error(&self, error: bool);
}

/// The control that starts a list load.
pub trait LoadTrigger: Send + Sync {
    /// Enables or disables the control.
    fn set_disabled(&self, disabled: bool);
}

/// The container rendered books are placed in.
pub trait BooksContainer: Send + Sync {
    /// Removes every rendered entry.
    fn clear(&self);
    /// Appends one entry; `card_html` is already escaped.
    fn append(&self, book: &Book, card_html: String);
}

/// A page-like environment for the controller.
#[async_trait]
pub trait Host: Send + Sync {
    /// Looks up the status line.
    fn status_text(&self) -> Option<Arc<dyn StatusText>>;
    /// Looks up the load trigger.
    fn load_trigger(&self) -> Option<Arc<dyn LoadTrigger>>;
    /// Looks up the books container.
    fn books_container(&self) -> Option<Arc<dyn BooksContainer>>;
    /// Shows a blocking message to the user.
    fn alert(&self, message: &str);
    /// Moves the page to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError`] when the host cannot follow the link.
    async fn navigate(&self, url: &str) -> Result<(), NavigationError>;
}
