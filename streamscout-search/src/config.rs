//! Discovery configuration with sensible defaults.
//!
//! [`SearchConfig`] is the explicit replacement for a shared, mutable HTTP
//! session: it is handed to each component at construction and carries the
//! timeouts, result limits, User-Agent, proxy, and fallback endpoints.

use crate::error::SearchError;

/// Default per-request timeout for provider searches and embed fetches.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default bound on the external media-search tool.
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

/// Default secondary web-search endpoint (HTML-only DuckDuckGo).
pub const DEFAULT_SECONDARY_SEARCH_URL: &str = "https://html.duckduckgo.com/html/";

/// Configuration for a discovery call.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Per-request HTTP timeout in seconds (provider search, embed fetch,
    /// secondary search).
    pub timeout_seconds: u64,
    /// Maximum results kept from a single provider response.
    pub max_results_per_provider: usize,
    /// Maximum results taken from the secondary web search.
    pub secondary_max_results: usize,
    /// Endpoint of the secondary web search.
    pub secondary_search_url: String,
    /// Name or path of the external media-search binary.
    pub tool_binary: String,
    /// Time budget for one external tool invocation, in seconds.
    pub tool_timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// Proxy URL applied uniformly to HTTP and HTTPS requests.
    pub proxy: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            max_results_per_provider: 20,
            secondary_max_results: 10,
            secondary_search_url: DEFAULT_SECONDARY_SEARCH_URL.to_owned(),
            tool_binary: "yt-dlp".to_owned(),
            tool_timeout_seconds: DEFAULT_TOOL_TIMEOUT_SECS,
            user_agent: None,
            proxy: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds` and `tool_timeout_seconds` must be greater than 0
    /// - `max_results_per_provider` and `secondary_max_results` must be greater than 0
    /// - `secondary_search_url` must be an absolute http(s) URL
    /// - `tool_binary` must not be empty
    /// - `proxy`, if set, must be an http(s) URL
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.tool_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "tool_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.max_results_per_provider == 0 {
            return Err(SearchError::Config(
                "max_results_per_provider must be greater than 0".into(),
            ));
        }
        if self.secondary_max_results == 0 {
            return Err(SearchError::Config(
                "secondary_max_results must be greater than 0".into(),
            ));
        }
        match url::Url::parse(&self.secondary_search_url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            _ => {
                return Err(SearchError::Config(format!(
                    "secondary_search_url is not an http(s) URL: {}",
                    self.secondary_search_url
                )))
            }
        }
        if self.tool_binary.trim().is_empty() {
            return Err(SearchError::Config("tool_binary must not be empty".into()));
        }
        if let Some(ref proxy) = self.proxy {
            match url::Url::parse(proxy) {
                Ok(u) if matches!(u.scheme(), "http" | "https") => {}
                _ => {
                    return Err(SearchError::Config(format!(
                        "proxy must be an http(s) URL: {proxy}"
                    )))
                }
            }
        }
        Ok(())
    }
}
