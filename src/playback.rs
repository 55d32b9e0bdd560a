//! Hand-off to the local media player and downloader.
//!
//! Both are external binaries located on `PATH` (or given as paths in
//! [`PlaybackConfig`]). Every process runs with a bounded lifetime and is
//! killed if the bound is exceeded.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::app_dirs;
use crate::config::PlaybackConfig;
use crate::error::{Result, StreamError};

/// Upper bound on turning an embed page into a direct stream URL.
pub const RESOLVE_TIMEOUT_SECS: u64 = 30;

/// What happened when playback was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// The player ran until it exited or hit the process bound.
    Played,
    /// No player is installed; the caller should show the URL instead.
    ManualFallback(String),
}

/// Runs the configured player and downloader.
#[derive(Debug, Clone)]
pub struct Player {
    config: PlaybackConfig,
}

impl Player {
    /// Player and downloader as described by `config`.
    pub fn new(config: PlaybackConfig) -> Self {
        Self { config }
    }

    fn process_timeout(&self) -> Duration {
        Duration::from_secs(self.config.process_timeout_seconds)
    }

    /// Ask the downloader for the direct stream behind `url`.
    ///
    /// Returns `None` if the downloader is missing, fails, times out, or
    /// prints nothing usable.
    pub async fn resolve_stream(&self, url: &str) -> Option<String> {
        let binary = which::which(&self.config.downloader).ok()?;
        let child = Command::new(&binary)
            .args(["-f", "best", "--no-playlist", "--get-url", url])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .ok()?;

        match timeout(Duration::from_secs(RESOLVE_TIMEOUT_SECS), child.wait_with_output()).await {
            Ok(Ok(output)) if output.status.success() => {
                streamscout_search::tool::first_url(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(Ok(output)) => {
                debug!(status = %output.status, "stream resolution failed");
                None
            }
            Ok(Err(e)) => {
                debug!(error = %e, "stream resolution failed");
                None
            }
            Err(_) => {
                warn!("stream resolution timed out after {RESOLVE_TIMEOUT_SECS}s");
                None
            }
        }
    }

    /// Play `url`, resolving it to a direct stream first when it is an
    /// embed page.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Tool`] if the player cannot be started.
    pub async fn play(&self, url: &str, is_embed: bool) -> Result<PlaybackOutcome> {
        let target = if is_embed {
            match self.resolve_stream(url).await {
                Some(stream) => {
                    info!(stream = %stream, "resolved embed to direct stream");
                    stream
                }
                None => url.to_owned(),
            }
        } else {
            url.to_owned()
        };

        let Ok(player) = which::which(&self.config.player) else {
            warn!(player = %self.config.player, "player not installed");
            return Ok(PlaybackOutcome::ManualFallback(target));
        };

        info!(player = %player.display(), url = %target, "starting playback");
        let mut child = Command::new(&player)
            .args(&self.config.player_args)
            .arg(&target)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| StreamError::Tool(format!("failed to start {}: {e}", player.display())))?;

        match timeout(self.process_timeout(), child.wait()).await {
            Ok(Ok(status)) if !status.success() => {
                warn!(%status, "player exited with an error");
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(StreamError::Tool(format!("{} failed: {e}", player.display())));
            }
            Err(_) => {
                info!(
                    "playback reached the {}s limit, stopping player",
                    self.config.process_timeout_seconds
                );
                if let Err(e) = child.kill().await {
                    debug!(error = %e, "failed to stop player");
                }
            }
        }
        Ok(PlaybackOutcome::Played)
    }

    /// Download `url` into `dir`, or the configured / platform download folder.
    ///
    /// Returns the directory the file was written to.
    ///
    /// # Errors
    ///
    /// - [`StreamError::ToolUnavailable`] if the downloader is not installed.
    /// - [`StreamError::Tool`] if it fails or exceeds the process bound.
    /// - [`StreamError::Io`] if the target directory cannot be created.
    pub async fn download(&self, url: &str, dir: Option<&Path>) -> Result<PathBuf> {
        let dir = dir
            .map(Path::to_path_buf)
            .or_else(|| self.config.download_dir.clone())
            .unwrap_or_else(app_dirs::default_download_dir);

        let binary = which::which(&self.config.downloader)
            .map_err(|_| StreamError::ToolUnavailable(self.config.downloader.clone()))?;
        std::fs::create_dir_all(&dir)?;

        let template = output_template(&dir);
        info!(dir = %dir.display(), url = %url, "starting download");
        let mut child = Command::new(&binary)
            .arg("-o")
            .arg(&template)
            .arg(url)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| StreamError::Tool(format!("failed to start {}: {e}", binary.display())))?;

        match timeout(self.process_timeout(), child.wait()).await {
            Ok(Ok(status)) if status.success() => Ok(dir),
            Ok(Ok(status)) => Err(StreamError::Tool(format!(
                "{} exited with {status}",
                self.config.downloader
            ))),
            Ok(Err(e)) => Err(StreamError::Tool(format!("{} failed: {e}", binary.display()))),
            Err(_) => {
                if let Err(e) = child.kill().await {
                    debug!(error = %e, "failed to stop downloader");
                }
                Err(StreamError::Tool(format!(
                    "download exceeded {}s",
                    self.config.process_timeout_seconds
                )))
            }
        }
    }
}

/// `<dir>/%(title)s.%(ext)s`
fn output_template(dir: &Path) -> String {
    dir.join("%(title)s.%(ext)s").to_string_lossy().into_owned()
}
