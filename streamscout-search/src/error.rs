//! Error types for the streamscout-search crate.
//!
//! Source-level failures (a provider timing out, an unparseable page) are
//! logged and isolated inside the pipeline and never reach the caller. The
//! variants here are the ones a caller can actually observe: bad
//! configuration, a single explicit fetch failing, a missing external tool,
//! cancellation, and total exhaustion of the fallback chain.

/// Errors that can occur during media discovery.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Every stage of the fallback chain came back empty.
    #[error("no results: {0}")]
    Exhausted(String),

    /// A request exceeded its time budget.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// An HTTP request failed (connection, TLS, or non-success status).
    #[error("HTTP error: {0}")]
    Http(String),

    /// A page could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid configuration, including an empty provider set.
    #[error("config error: {0}")]
    Config(String),

    /// An external binary (search tool, player) is not installed.
    #[error("tool unavailable: {0}")]
    ToolUnavailable(String),

    /// An external binary ran but failed.
    #[error("tool error: {0}")]
    Tool(String),

    /// The discovery call was cancelled by the caller.
    #[error("discovery cancelled")]
    Cancelled,
}

impl SearchError {
    /// Map a reqwest error onto `Timeout` or `Http`, prefixed with `context`.
    pub(crate) fn from_reqwest(context: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("{context}: {err}"))
        } else {
            Self::Http(format!("{context}: {err}"))
        }
    }
}

/// Convenience type alias for streamscout-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
