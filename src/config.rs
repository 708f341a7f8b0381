//! Runtime configuration injected into the view controller.
//!
//! Everything the controller used to look up ad hoc (API base, wording,
//! encoder choice) is carried here instead, so hosts and tests build a
//! controller from explicit values.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

use crate::encoding::IdEncoder;
use crate::transport::HttpSettings;
use crate::view::Locale;

/// Errors raised while building configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// API base is not an absolute http(s) URL.
    #[error("invalid API base '{value}': {reason}")]
    InvalidApiBase {
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A keyword setting had an unrecognized value.
    #[error("invalid {field} '{value}': expected one of {expected}")]
    InvalidChoice {
        /// Setting name.
        field: &'static str,
        /// The rejected value.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },

    /// A timeout is outside `1..=3600` seconds.
    #[error("invalid {field} {value}: expected range 1..=3600")]
    InvalidTimeout {
        /// Setting name.
        field: &'static str,
        /// The rejected value.
        value: u64,
    },
}

impl ConfigError {
    pub(crate) fn invalid_choice(
        field: &'static str,
        value: &str,
        expected: &'static str,
    ) -> Self {
        Self::InvalidChoice {
            field,
            value: value.to_string(),
            expected,
        }
    }
}

/// Which request mechanisms the host is allowed to expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportPreference {
    /// Exchange if available, else fetch.
    #[default]
    Auto,
    /// Exchange only.
    Exchange,
    /// Fetch only.
    Fetch,
}

impl TransportPreference {
    /// Stable label used in config files and flags.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Exchange => "exchange",
            Self::Fetch => "fetch",
        }
    }
}

impl fmt::Display for TransportPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportPreference {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "exchange" => Ok(Self::Exchange),
            "fetch" => Ok(Self::Fetch),
            _ => Err(ConfigError::invalid_choice(
                "transport",
                value,
                "auto, exchange, fetch",
            )),
        }
    }
}

/// Base URL of the catalog API, normalized without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase(String);

impl ApiBase {
    /// Validates and normalizes an API base.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiBase`] for relative or non-http(s) URLs.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let trimmed = value.trim();
        let parsed = Url::parse(trimmed).map_err(|e| ConfigError::InvalidApiBase {
            value: value.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidApiBase {
                value: value.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ConfigError::InvalidApiBase {
                value: value.to_string(),
                reason: "query and fragment are not allowed".to_string(),
            });
        }
        Ok(Self(trimmed.trim_end_matches('/').to_string()))
    }

    /// The normalized base.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<base>/books`
    #[must_use]
    pub fn books_url(&self) -> String {
        format!("{}/books", self.0)
    }

    /// `<base>/books/<encoded_id>`
    #[must_use]
    pub fn book_url(&self, encoded_id: &str) -> String {
        format!("{}/books/{encoded_id}", self.0)
    }

    /// `<base>/books/<encoded_id>/download`
    #[must_use]
    pub fn download_url(&self, encoded_id: &str) -> String {
        format!("{}/books/{encoded_id}/download", self.0)
    }
}

impl fmt::Display for ApiBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ApiBase {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// Controller configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Catalog API base.
    pub api_base: ApiBase,
    /// Wording for status lines and placeholders.
    pub locale: Locale,
    /// How book ids are percent-encoded into paths.
    pub encoder: IdEncoder,
    /// Which request mechanisms the host exposes.
    pub transport: TransportPreference,
    /// Client timeouts.
    pub http: HttpSettings,
}

impl ClientConfig {
    /// Configuration with defaults for everything but the base.
    #[must_use]
    pub fn new(api_base: ApiBase) -> Self {
        Self {
            api_base,
            locale: Locale::default(),
            encoder: IdEncoder::default(),
            transport: TransportPreference::default(),
            http: HttpSettings::default(),
        }
    }

    /// Sets the locale.
    #[must_use]
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Sets the id encoder.
    #[must_use]
    pub fn with_encoder(mut self, encoder: IdEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Sets the transport preference.
    #[must_use]
    pub fn with_transport(mut self, transport: TransportPreference) -> Self {
        self.transport = transport;
        self
    }

    /// Sets client timeouts after range-checking them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTimeout`] outside `1..=3600` seconds.
    pub fn with_http(mut self, http: HttpSettings) -> Result<Self, ConfigError> {
        validate_timeout("connect_timeout_secs", http.connect_timeout_secs)?;
        validate_timeout("read_timeout_secs", http.read_timeout_secs)?;
        self.http = http;
        Ok(self)
    }
}

/// Range-checks a timeout setting.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidTimeout`] outside `1..=3600` seconds.
pub fn validate_timeout(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if (1..=3600).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidTimeout { field, value })
    }
}
