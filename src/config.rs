//! Application configuration, persisted as TOML.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use streamscout_search::SearchConfig;

use crate::error::{Result, StreamError};

/// Where the shared provider list is published.
pub const DEFAULT_REMOTE_PROVIDERS_URL: &str =
    "https://raw.githubusercontent.com/streamscout/stream-providers/main/providers.json";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP behaviour shared by every request.
    pub network: NetworkConfig,
    /// Provider list source and selection.
    pub providers: ProvidersConfig,
    /// External player and downloader.
    pub playback: PlaybackConfig,
}

/// HTTP settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Per-request timeout for provider searches and embed pages.
    pub timeout_seconds: u64,
    /// HTTP(S) proxy for every request.
    pub proxy: Option<String>,
    /// Fixed User-Agent. Unset rotates through browser User-Agents.
    pub user_agent: Option<String>,
    /// Budget for each health probe (clamped to 2-10s).
    pub probe_timeout_seconds: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: streamscout_search::config::DEFAULT_TIMEOUT_SECS,
            proxy: None,
            user_agent: None,
            probe_timeout_seconds: 5,
        }
    }
}

/// Provider list settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Remote JSON provider list used when no local copy exists.
    pub remote_url: String,
    /// Search only the legal provider set by default.
    pub legal_only: bool,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            remote_url: DEFAULT_REMOTE_PROVIDERS_URL.to_owned(),
            legal_only: false,
        }
    }
}

/// External tool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Media player binary.
    pub player: String,
    /// Arguments placed before the URL.
    pub player_args: Vec<String>,
    /// Stream extractor / downloader binary. Also used as the last
    /// discovery stage.
    pub downloader: String,
    /// Download target. Unset uses the platform download folder.
    pub download_dir: Option<PathBuf>,
    /// Upper bound on a playback or download process.
    pub process_timeout_seconds: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            player: "mpv".to_owned(),
            player_args: vec!["--hwdec=auto".to_owned()],
            downloader: "yt-dlp".to_owned(),
            download_dir: None,
            process_timeout_seconds: 3600,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| StreamError::Config(e.to_string()))
    }

    /// Load `path` if it exists, otherwise defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| StreamError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The discovery configuration implied by these settings.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Search`] if the resulting configuration is invalid.
    pub fn search_config(&self) -> Result<SearchConfig> {
        let config = SearchConfig {
            timeout_seconds: self.network.timeout_seconds,
            proxy: self.network.proxy.clone(),
            user_agent: self.network.user_agent.clone(),
            tool_binary: self.playback.downloader.clone(),
            ..SearchConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}
