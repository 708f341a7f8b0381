//! Terminal host: status goes to the log, books are printed as text.

use std::borrow::Cow;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::catalog::Book;
use crate::navigate::{NavigationError, Navigator};

use super::host::{BooksContainer, Host, LoadTrigger, StatusText};

#[derive(Debug, Default)]
struct TerminalStatus {
    last: Mutex<String>,
    error: AtomicBool,
}

impl StatusText for TerminalStatus {
    fn set_text(&self, text: &str) {
        info!(status = %text, "status");
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = text.to_string();
    }

    fn set_error(&self, error: bool) {
        debug!(error, "status styling");
        self.error.store(error, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
struct TerminalTrigger;

impl LoadTrigger for TerminalTrigger {
    fn set_disabled(&self, disabled: bool) {
        debug!(disabled, "load trigger");
    }
}

struct TerminalBooks {
    out: Mutex<Box<dyn Write + Send>>,
    count: Mutex<usize>,
}

impl BooksContainer for TerminalBooks {
    fn clear(&self) {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner) = 0;
    }

    fn append(&self, book: &Book, _card_html: String) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count += 1;
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = write_book(&mut *out, *count, book) {
            warn!(error = %e, "failed to print book");
        }
    }
}

fn write_book(out: &mut dyn Write, index: usize, book: &Book) -> io::Result<()> {
    writeln!(
        out,
        "{index}. {} | {}",
        printable(&book.title),
        printable(&book.author)
    )?;
    if !book.id.is_empty() {
        writeln!(out, "   id: {}", printable(&book.id))?;
    }
    writeln!(out, "   {}", printable(&book.description))?;
    out.flush()
}

/// Escapes control characters so catalog text cannot drive the terminal.
fn printable(text: &str) -> Cow<'_, str> {
    if !text.chars().any(char::is_control) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if c.is_control() {
            out.extend(c.escape_unicode());
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Host that prints books to a writer and follows links with a [`Navigator`].
pub struct TerminalHost {
    status: Arc<TerminalStatus>,
    trigger: Arc<TerminalTrigger>,
    books: Arc<TerminalBooks>,
    navigator: Arc<dyn Navigator>,
}

impl TerminalHost {
    /// Prints books to standard output.
    #[must_use]
    pub fn stdout(navigator: Arc<dyn Navigator>) -> Self {
        Self::new(Box::new(io::stdout()), navigator)
    }

    /// Prints books to `out`.
    #[must_use]
    pub fn new(out: Box<dyn Write + Send>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            status: Arc::new(TerminalStatus::default()),
            trigger: Arc::new(TerminalTrigger),
            books: Arc::new(TerminalBooks {
                out: Mutex::new(out),
                count: Mutex::new(0),
            }),
            navigator,
        }
    }

    /// Last status text and whether it was an error.
    #[must_use]
    pub fn last_status(&self) -> (String, bool) {
        let text = self
            .status
            .last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        (text, self.status.error.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl Host for TerminalHost {
    fn status_text(&self) -> Option<Arc<dyn StatusText>> {
        Some(Arc::clone(&self.status) as Arc<dyn StatusText>)
    }

    fn load_trigger(&self) -> Option<Arc<dyn LoadTrigger>> {
        Some(Arc::clone(&self.trigger) as Arc<dyn LoadTrigger>)
    }

    fn books_container(&self) -> Option<Arc<dyn BooksContainer>> {
        Some(Arc::clone(&self.books) as Arc<dyn BooksContainer>)
    }

    fn alert(&self, message: &str) {
        error!(alert = %message, "alert");
    }

    async fn navigate(&self, url: &str) -> Result<(), NavigationError> {
        self.navigator.navigate(url).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::navigate::LinkPrinter;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn book(id: &str, title: &str) -> Book {
        Book {
            id: id.to_string(),
            title: title.to_string(),
            author: "A".to_string(),
            description: "D".to_string(),
        }
    }

    #[test]
    fn test_terminal_books_numbered_in_order() {
        let buf = SharedBuf::default();
        let host = TerminalHost::new(Box::new(buf.clone()), Arc::new(LinkPrinter::new(Vec::new())));
        let container = host.books_container().unwrap();
        container.append(&book("1", "First"), String::new());
        container.append(&book("", "Second"), String::new());
        let printed = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(printed, "1. First | A\n   id: 1\n   D\n2. Second | A\n   D\n");
    }

    #[test]
    fn test_terminal_escapes_control_sequences_in_book_fields() {
        let buf = SharedBuf::default();
        let host = TerminalHost::new(Box::new(buf.clone()), Arc::new(LinkPrinter::new(Vec::new())));
        let container = host.books_container().unwrap();
        let hostile = Book {
            id: "b\r1".to_string(),
            title: "Dune\x1b]0;pwned\x07\x1b[2J".to_string(),
            author: "Frank\u{9b}31m".to_string(),
            description: "line\nbreak".to_string(),
        };
        container.append(&hostile, String::new());
        let printed = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();

        assert!(!printed.contains('\x1b'));
        assert!(!printed.contains('\x07'));
        assert!(!printed.contains('\r'));
        assert!(!printed.contains('\u{9b}'));
        assert!(printed.starts_with("1. Dune\\u{1b}]0;pwned\\u{7}\\u{1b}[2J | Frank\\u{9b}31m\n"));
        assert!(printed.contains("   id: b\\u{d}1\n"));
        assert!(printed.contains("   line\\u{a}break\n"));
    }

    #[test]
    fn test_printable_borrows_clean_text() {
        assert!(matches!(printable("Ubik 书"), Cow::Borrowed("Ubik 书")));
    }

    #[test]
    fn test_terminal_clear_restarts_numbering() {
        let buf = SharedBuf::default();
        let host = TerminalHost::new(Box::new(buf.clone()), Arc::new(LinkPrinter::new(Vec::new())));
        let container = host.books_container().unwrap();
        container.append(&book("1", "First"), String::new());
        container.clear();
        container.append(&book("2", "Again"), String::new());
        let printed = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(printed.contains("1. Again"), "got: {printed}");
    }

    #[test]
    fn test_last_status_tracks_error_flag() {
        let host = TerminalHost::new(Box::new(io::sink()), Arc::new(LinkPrinter::new(Vec::new())));
        let status = host.status_text().unwrap();
        status.set_text("Load failed: HTTP 500");
        status.set_error(true);
        assert_eq!(host.last_status(), ("Load failed: HTTP 500".to_string(), true));
    }
}
