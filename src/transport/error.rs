//! Error types for the transport adapter.
//!
//! Display strings are the canonical English messages surfaced in the status
//! line. Localized variants live in [`crate::view::Messages`].

use thiserror::Error;

/// Normalized failure of a single catalog request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No status was available: DNS, connect, TLS, reset, or timeout.
    #[error("network error")]
    Network {
        /// Underlying cause, for logs only.
        detail: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
    },

    /// The body of a successful response was not valid JSON.
    #[error("response parse failed")]
    ParseFailed {
        /// Parser message, for logs only.
        detail: String,
    },

    /// The request could not be issued at all.
    #[error("failed to send request")]
    SendFailed {
        /// Underlying cause, for logs only.
        detail: String,
    },

    /// Neither transport mechanism is available on this host.
    #[error("host does not support network requests")]
    Unsupported,

    /// A backend panicked while the request was being set up or executed.
    #[error("request exception: {message}")]
    Exception {
        /// Panic payload text.
        message: String,
    },

    /// A fetch-style failure passed through with its own message.
    #[error("{message}")]
    Propagated {
        /// Message of the original error.
        message: String,
    },
}

impl TransportError {
    /// Creates a network error.
    pub fn network(detail: impl Into<String>) -> Self {
        Self::Network {
            detail: detail.into(),
        }
    }

    /// Creates an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16) -> Self {
        Self::HttpStatus { status }
    }

    /// Creates a parse error.
    pub fn parse_failed(detail: impl Into<String>) -> Self {
        Self::ParseFailed {
            detail: detail.into(),
        }
    }

    /// Creates a send error.
    pub fn send_failed(detail: impl Into<String>) -> Self {
        Self::SendFailed {
            detail: detail.into(),
        }
    }

    /// Wraps a caught panic message.
    pub fn exception(message: impl Into<String>) -> Self {
        Self::Exception {
            message: message.into(),
        }
    }

    /// Passes an arbitrary error message through unchanged.
    pub fn propagated(message: impl std::fmt::Display) -> Self {
        Self::Propagated {
            message: message.to_string(),
        }
    }

    /// Returns the HTTP status code when this is a status error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display_has_code() {
        let error = TransportError::http_status(500);
        assert_eq!(error.to_string(), "HTTP 500");
        assert_eq!(error.status(), Some(500));
    }

    #[test]
    fn test_network_display_hides_detail() {
        let error = TransportError::network("connection refused (os error 111)");
        assert_eq!(error.to_string(), "network error");
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_parse_failed_display() {
        let error = TransportError::parse_failed("expected value at line 1 column 1");
        assert_eq!(error.to_string(), "response parse failed");
    }

    #[test]
    fn test_exception_display_wraps_message() {
        let error = TransportError::exception("backend exploded");
        assert_eq!(error.to_string(), "request exception: backend exploded");
    }

    #[test]
    fn test_propagated_display_is_verbatim() {
        let error = TransportError::propagated("EOF while parsing a value");
        assert_eq!(error.to_string(), "EOF while parsing a value");
    }
}
