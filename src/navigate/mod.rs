//! Navigation to resolved download links.
//!
//! A browser would simply set its location to the presigned URL. Outside a
//! browser the same step is a [`Navigator`]:
//!
//! - [`LinkPrinter`] - writes the link for the user to open
//! - [`FileFetcher`] - streams the linked file into a directory

mod error;
mod file;
mod filename;

pub use error::NavigationError;
pub use file::{FileFetcher, SavedFile};

use std::io::{self, Write};
use std::sync::Mutex;

use async_trait::async_trait;

/// Follows a download link.
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Navigates to `url` exactly as given.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError`] when the target cannot be followed.
    async fn navigate(&self, url: &str) -> Result<(), NavigationError>;
}

/// Navigator that writes each link on its own line.
///
/// Links carrying control characters are refused rather than printed.
#[derive(Debug)]
pub struct LinkPrinter<W> {
    out: Mutex<W>,
}

impl LinkPrinter<io::Stdout> {
    /// Prints links to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> LinkPrinter<W> {
    /// Prints links to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl<W: Write + Send + 'static> Navigator for LinkPrinter<W> {
    async fn navigate(&self, url: &str) -> Result<(), NavigationError> {
        if url.chars().any(char::is_control) {
            return Err(NavigationError::invalid_url(url.escape_debug().to_string()));
        }
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        writeln!(out, "{url}")
            .and_then(|()| out.flush())
            .map_err(|e| NavigationError::io("-", e))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_link_printer_writes_url_verbatim() {
        let printer = LinkPrinter::new(Vec::new());
        let url = "https://bucket.s3.amazonaws.com/a%20b.pdf?X-Amz-Signature=ab%2Bcd";
        printer.navigate(url).await.unwrap();
        let written = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(written, format!("{url}\n"));
    }

    #[tokio::test]
    async fn test_link_printer_refuses_control_characters() {
        let printer = LinkPrinter::new(Vec::new());
        let err = printer
            .navigate("https://x/y.pdf\x1b]8;;https://evil/\x07")
            .await
            .unwrap_err();
        assert!(matches!(err, NavigationError::InvalidUrl { ref url } if !url.contains('\x1b')));
        assert!(printer.into_inner().is_empty());
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_link_printer_reports_write_failure() {
        let printer = LinkPrinter::new(BrokenPipe);
        let err = printer.navigate("https://x/y").await.unwrap_err();
        assert!(matches!(err, NavigationError::Io { .. }));
    }
}
