//! streamscout: find a title across streaming listing sites and hand it to a
//! local player.
//!
//! Discovery itself lives in [`streamscout_search`]. This crate adds the
//! pieces around it:
//! - **Configuration**: a TOML [`config::AppConfig`] in the platform config dir
//! - **Providers**: the provider list, cached locally and refreshed from a
//!   remote JSON file ([`providers::ProviderManager`])
//! - **Playback**: delegation to `mpv` and `yt-dlp` ([`playback::Player`])

pub mod app_dirs;
pub mod config;
pub mod error;
pub mod playback;
pub mod providers;

pub use config::AppConfig;
pub use error::{Result, StreamError};
pub use playback::{PlaybackOutcome, Player};
pub use providers::{ProviderManager, ProviderSet, ProviderSource};
