//! Shared reqwest client construction for the catalog and navigation paths.
//!
//! Centralizes user-agent, compression and the system-proxy panic fallback.
//! Catalog clients carry a whole-request timeout; the file navigator's client
//! only bounds connecting and stalled reads.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use tracing::warn;

use crate::user_agent;

use super::TransportError;

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default whole-request timeout in seconds.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Longest a file download may stall between body reads, in seconds.
pub const DOWNLOAD_STALL_TIMEOUT_SECS: u64 = 300;

/// Timeout settings applied to every client this crate builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub read_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

/// Builds an HTTP client using shared project policy.
///
/// # Errors
///
/// Returns [`TransportError::SendFailed`] when the client cannot be built,
/// including when both the system-proxy and env-proxy builders panic.
pub fn build_http_client(settings: HttpSettings) -> Result<Client, TransportError> {
    build_with(settings, base_builder)
}

/// Builds the client used to save presigned files.
///
/// File bodies can take far longer than a catalog response, so there is no
/// whole-request timeout. Only the connect timeout from `settings` applies,
/// plus a per-read stall limit of at least [`DOWNLOAD_STALL_TIMEOUT_SECS`].
///
/// # Errors
///
/// Returns [`TransportError::SendFailed`] when the client cannot be built.
pub fn build_download_client(settings: HttpSettings) -> Result<Client, TransportError> {
    build_with(settings, download_builder)
}

fn build_with(
    settings: HttpSettings,
    builder: fn(HttpSettings) -> ClientBuilder,
) -> Result<Client, TransportError> {
    match try_build(settings, builder, false) {
        Ok(client) => Ok(client),
        Err(BuildFailure::Panic) => {
            // Some sandboxed macOS hosts panic while reading system proxy
            // settings; env proxies still work without that lookup.
            warn!("HTTP client hit system proxy panic; using env-proxy fallback builder");
            match try_build(settings, builder, true) {
                Ok(client) => Ok(client),
                Err(BuildFailure::Panic) => Err(TransportError::send_failed(
                    "HTTP client construction panicked",
                )),
                Err(BuildFailure::Build(error)) => Err(TransportError::send_failed(format!(
                    "HTTP client construction failed: {error}"
                ))),
            }
        }
        Err(BuildFailure::Build(error)) => Err(TransportError::send_failed(format!(
            "HTTP client construction failed: {error}"
        ))),
    }
}

enum BuildFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build(
    settings: HttpSettings,
    builder: fn(HttpSettings) -> ClientBuilder,
    skip_system_proxy: bool,
) -> Result<Client, BuildFailure> {
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = builder(settings);
        if skip_system_proxy {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildFailure::Build)
    }))
    .map_err(|_| BuildFailure::Panic)?
}

fn base_builder(settings: HttpSettings) -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .timeout(Duration::from_secs(settings.read_timeout_secs))
        .user_agent(user_agent::default_user_agent())
        .gzip(true)
}

fn download_builder(settings: HttpSettings) -> ClientBuilder {
    let stall = settings.read_timeout_secs.max(DOWNLOAD_STALL_TIMEOUT_SECS);
    Client::builder()
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .read_timeout(Duration::from_secs(stall))
        .user_agent(user_agent::default_user_agent())
        .gzip(true)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = first_env_value(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"])
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = first_env_value(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"])
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn first_env_value(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}
