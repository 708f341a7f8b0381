//! User-Agent string shared by every HTTP client the crate builds.

/// Project URL for User-Agent identification (RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/bookshelf";

/// Default User-Agent for catalog and download requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("bookshelf/{version} (catalog-client; +{PROJECT_UA_URL})")
}
