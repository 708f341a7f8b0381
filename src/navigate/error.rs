//! Error types for navigation to a resolved download link.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while following a download link.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// The target is not an absolute URL this host can follow.
    #[error("invalid navigation target: {url}")]
    InvalidUrl {
        /// The rejected target.
        url: String,
    },

    /// The host refused to navigate.
    #[error("navigation blocked: {reason}")]
    Blocked {
        /// Why the host refused.
        reason: String,
    },

    /// Network-level failure while fetching the target.
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The target URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The target answered with a non-success status (expired links give 403).
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The target URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Writing the link or the fetched file failed.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// Destination path, or `-` for standard output.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl NavigationError {
    /// Creates an invalid-target error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a blocked-navigation error.
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self::Blocked {
            reason: reason.into(),
        }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
