//! External media-search tool: the last discovery stage.
//!
//! [`MediaSearchTool`] is the seam the fallback chain calls through;
//! [`YtDlpTool`] is the production implementation, spawning `yt-dlp` with a
//! site-search query and reading the first stream URL it prints.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::orchestrator::url_normalize::has_http_scheme;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Resolves a free-text query straight to a stream URL.
///
/// Implementations must be `Send + Sync` so the orchestrator can be shared
/// across tasks.
pub trait MediaSearchTool: Send + Sync {
    /// Find a stream for `query`.
    ///
    /// `Ok(None)` means the tool ran but reported nothing usable.
    ///
    /// # Errors
    ///
    /// [`SearchError::ToolUnavailable`] if the tool is not installed,
    /// [`SearchError::Timeout`] if it exceeded its budget, and
    /// [`SearchError::Tool`] for any other failure.
    fn find_stream(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, SearchError>> + Send;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// `yt-dlp -f best --get-url "ytsearch:<query> full movie"`.
#[derive(Debug, Clone)]
pub struct YtDlpTool {
    binary: String,
    timeout: Duration,
}

impl YtDlpTool {
    /// Build from the tool fields of `config`.
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            binary: config.tool_binary.clone(),
            timeout: Duration::from_secs(config.tool_timeout_seconds),
        }
    }

    /// The site-search term handed to the tool.
    pub fn search_term(query: &str) -> String {
        format!("ytsearch:{} full movie", query.trim())
    }
}

impl MediaSearchTool for YtDlpTool {
    async fn find_stream(&self, query: &str) -> Result<Option<String>, SearchError> {
        let term = Self::search_term(query);
        tracing::trace!(binary = %self.binary, term = %term, "running media-search tool");

        let child = Command::new(&self.binary)
            .args(["-f", "best", "--get-url", term.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    SearchError::ToolUnavailable(format!("{} not found", self.binary))
                }
                _ => SearchError::Tool(format!("failed to start {}: {e}", self.binary)),
            })?;

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => {
                result.map_err(|e| SearchError::Tool(format!("{} failed: {e}", self.binary)))?
            }
            Err(_) => {
                return Err(SearchError::Timeout(format!(
                    "{} exceeded {}s",
                    self.binary,
                    self.timeout.as_secs()
                )))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
            return Err(SearchError::Tool(format!(
                "{} exited with {}: {reason}",
                self.binary, output.status
            )));
        }

        Ok(first_url(&String::from_utf8_lossy(&output.stdout)))
    }

    fn name(&self) -> &str {
        &self.binary
    }
}

/// First non-empty line of tool output, if it is an http(s) URL.
///
/// Stream extractors print one URL per selected format; the first is the
/// one to play.
pub fn first_url(stdout: &str) -> Option<String> {
    let line = stdout.lines().map(str::trim).find(|l| !l.is_empty())?;
    if has_http_scheme(line) && url::Url::parse(line).is_ok() {
        Some(line.to_owned())
    } else {
        None
    }
}
