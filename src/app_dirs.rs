//! Centralized filesystem paths for streamscout.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! # Directory Layout
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | Config | `~/Library/Application Support/streamscout/` | `~/.config/streamscout/` |
//! | Downloads | `~/Downloads/` | `~/Downloads/` |
//!
//! # Environment Overrides
//!
//! - `STREAMSCOUT_CONFIG_DIR` overrides [`config_dir`]

use std::path::PathBuf;

/// Application config directory.
///
/// Holds `config.toml` and the cached `providers.json`.
///
/// Resolves to `dirs::config_dir()/streamscout/` by default. Override with
/// the `STREAMSCOUT_CONFIG_DIR` environment variable.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("STREAMSCOUT_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("streamscout"))
        .unwrap_or_else(|| PathBuf::from("/tmp/streamscout-config"))
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Cached provider list (`config_dir()/providers.json`).
#[must_use]
pub fn providers_file() -> PathBuf {
    config_dir().join("providers.json")
}

/// Default download target: the user's download folder, else `~/Downloads`.
#[must_use]
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("Downloads"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_ends_with_config_toml() {
        let path = config_file();
        let s = path.to_string_lossy();
        assert!(s.ends_with("config.toml"), "config_file: {s}");
    }

    #[test]
    fn providers_file_is_json() {
        let file = providers_file();
        assert_eq!(file.file_name().and_then(|n| n.to_str()), Some("providers.json"));
    }

    #[test]
    fn default_download_dir_is_nonempty() {
        assert!(!default_download_dir().as_os_str().is_empty());
    }

    #[test]
    fn config_dir_override_via_env() {
        let key = "STREAMSCOUT_CONFIG_DIR";
        let original = std::env::var_os(key);

        // SAFETY: the only test in this crate touching this variable.
        unsafe { std::env::set_var(key, "/custom/config") };
        let result = config_dir();
        assert_eq!(result, PathBuf::from("/custom/config"));
        assert_eq!(providers_file(), PathBuf::from("/custom/config/providers.json"));

        match original {
            Some(val) => unsafe { std::env::set_var(key, val) },
            None => unsafe { std::env::remove_var(key) },
        }
    }
}
