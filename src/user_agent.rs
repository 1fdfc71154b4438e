//! Shared User-Agent string for fetch and crawl HTTP clients.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/grabber";

/// Default User-Agent for page and resource requests (identifies the tool).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("grabber/{version} (+{PROJECT_UA_URL})")
}
