//! Error types for the streamscout application layer.

use streamscout_search::SearchError;

/// Top-level error type for provider management, playback, and the CLI.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Provider list could not be fetched or stored.
    #[error("provider error: {0}")]
    Provider(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the discovery core.
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// A required external binary is not installed.
    #[error("tool unavailable: {0}")]
    ToolUnavailable(String),

    /// An external binary ran but failed.
    #[error("tool error: {0}")]
    Tool(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, StreamError>;
