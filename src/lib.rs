//! Bookshelf Core Library
//!
//! Client for a serverless book catalog: lists books, shows one book, and
//! follows presigned download links handed out by the API.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`transport`] - single-request JSON transport with exchange/fetch backends
//! - [`view`] - view controller, element traits, in-memory and terminal hosts
//! - [`catalog`] - book records and download link payloads
//! - [`render`] - HTML escaping and book card markup
//! - [`encoding`] - percent-encoding for book ids in URL paths
//! - [`navigate`] - following download links (print or save to disk)
//! - [`config`] - runtime configuration injected into the controller

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod encoding;
pub mod navigate;
pub mod render;
pub mod transport;
mod user_agent;
pub mod view;

// Re-export commonly used types
pub use catalog::{Book, DownloadLink};
pub use config::{ApiBase, ClientConfig, ConfigError, TransportPreference};
pub use encoding::IdEncoder;
pub use navigate::{FileFetcher, LinkPrinter, NavigationError, Navigator};
pub use transport::{HostCapabilities, HttpSettings, Transport, TransportError, TransportKind};
pub use view::{
    DownloadOutcome, Host, LoadOutcome, Locale, MemoryPage, Messages, StatusPhase, TerminalHost,
    ViewController,
};
