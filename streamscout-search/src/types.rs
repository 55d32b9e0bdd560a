//! Core types for discovery results, embed candidates, and provider health.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum display length of a result title, in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Results shown to the user from one discovery call.
pub const DISPLAY_LIMIT: usize = 15;

/// Elapsed time above which a reachable provider is classified as slow.
pub const SLOW_THRESHOLD_SECS: f64 = 5.0;

/// A single (title, URL) candidate found by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Display title, trimmed and at most [`MAX_TITLE_CHARS`] characters.
    pub title: String,
    /// Listing, detail, or media URL.
    pub url: String,
}

impl SearchResult {
    /// Create a result, trimming the title and capping it at
    /// [`MAX_TITLE_CHARS`] characters.
    pub fn new(title: impl AsRef<str>, url: impl Into<String>) -> Self {
        Self {
            title: truncate_chars(title.as_ref().trim(), MAX_TITLE_CHARS),
            url: url.into(),
        }
    }
}

/// Which step of the embed cascade produced an [`EmbedCandidate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedStrategy {
    /// An iframe inside a known player container.
    PlayerContainer,
    /// Any iframe whose `src` carries a media keyword.
    KeywordIframe,
    /// The `src` of a `<video>` element.
    VideoTag,
    /// A `<source>` child of a `<video>` element.
    VideoSource,
    /// A bare absolute `.m3u8`/`.mp4` URL anywhere in the markup.
    DirectUrl,
    /// One of the raw-markup patterns shared with result extraction.
    Pattern,
}

impl EmbedStrategy {
    /// Human-readable name for logs and display.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlayerContainer => "player iframe",
            Self::KeywordIframe => "iframe embed",
            Self::VideoTag => "video tag",
            Self::VideoSource => "video source",
            Self::DirectUrl => "direct URL",
            Self::Pattern => "markup pattern",
        }
    }
}

impl fmt::Display for EmbedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The single playable/embeddable URL resolved from a detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedCandidate {
    /// Absolute URL of the embed or media stream.
    pub url: String,
    /// The strategy that found it.
    pub strategy: EmbedStrategy,
}

/// Coarse health classification of a provider URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Reachable within [`SLOW_THRESHOLD_SECS`].
    Healthy,
    /// Reachable but slower than [`SLOW_THRESHOLD_SECS`].
    Slow,
    /// Unreachable, timed out, or answered with an error status.
    Dead,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => f.write_str("healthy"),
            Self::Slow => f.write_str("slow"),
            Self::Dead => f.write_str("dead"),
        }
    }
}

/// Outcome of probing a single provider URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    /// The probed URL.
    pub url: String,
    /// Whether the URL answered with a non-error status.
    pub reachable: bool,
    /// Wall-clock seconds spent; the timeout on timeout, 0 on other failures.
    pub elapsed_seconds: f64,
}

impl HealthRecord {
    /// Classify this record.
    pub fn status(&self) -> HealthStatus {
        if !self.reachable {
            HealthStatus::Dead
        } else if self.elapsed_seconds > SLOW_THRESHOLD_SECS {
            HealthStatus::Slow
        } else {
            HealthStatus::Healthy
        }
    }
}

/// States of the fallback chain, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryStage {
    /// Fan-out over the configured provider set.
    ProviderSearch,
    /// One general web search biased toward public video hosts.
    SecondarySearch,
    /// The external media-search tool.
    ExternalToolSearch,
    /// Terminal: every stage came back empty.
    Exhausted,
}

impl DiscoveryStage {
    /// The stage tried after this one. `Exhausted` is terminal.
    pub fn next(self) -> Self {
        match self {
            Self::ProviderSearch => Self::SecondarySearch,
            Self::SecondarySearch => Self::ExternalToolSearch,
            Self::ExternalToolSearch | Self::Exhausted => Self::Exhausted,
        }
    }

    /// Returns the human-readable name of this stage.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProviderSearch => "provider search",
            Self::SecondarySearch => "secondary search",
            Self::ExternalToolSearch => "external tool search",
            Self::Exhausted => "exhausted",
        }
    }
}

impl fmt::Display for DiscoveryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A successful discovery: the stage that produced results and the results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discovery {
    /// The stage that terminated the chain.
    pub stage: DiscoveryStage,
    /// Non-empty results in discovery order.
    pub results: Vec<SearchResult>,
}

impl Discovery {
    /// The first [`DISPLAY_LIMIT`] results.
    pub fn displayed(&self) -> &[SearchResult] {
        &self.results[..self.results.len().min(DISPLAY_LIMIT)]
    }
}

/// Truncate `s` to at most `max` characters on a char boundary.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_owned(),
        None => s.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_result_trims_title() {
        let result = SearchResult::new("  Inception (2010)\n", "https://h.test/movie/inception");
        assert_eq!(result.title, "Inception (2010)");
        assert_eq!(result.url, "https://h.test/movie/inception");
    }

    #[test]
    fn search_result_caps_title_length() {
        let long = "x".repeat(250);
        let result = SearchResult::new(&long, "https://h.test/");
        assert_eq!(result.title.chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("ééééé", 3), "ééé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn health_status_classification() {
        let record = |reachable, elapsed_seconds| HealthRecord {
            url: "https://h.test".into(),
            reachable,
            elapsed_seconds,
        };
        assert_eq!(record(true, 0.4).status(), HealthStatus::Healthy);
        assert_eq!(record(true, 5.0).status(), HealthStatus::Healthy);
        assert_eq!(record(true, 5.1).status(), HealthStatus::Slow);
        assert_eq!(record(false, 0.0).status(), HealthStatus::Dead);
        assert_eq!(record(false, 2.0).status(), HealthStatus::Dead);
    }

    #[test]
    fn health_status_display() {
        assert_eq!(HealthStatus::Healthy.to_string(), "healthy");
        assert_eq!(HealthStatus::Slow.to_string(), "slow");
        assert_eq!(HealthStatus::Dead.to_string(), "dead");
    }

    #[test]
    fn stages_advance_linearly() {
        let mut stage = DiscoveryStage::ProviderSearch;
        let mut seen = vec![stage];
        while stage != DiscoveryStage::Exhausted {
            stage = stage.next();
            seen.push(stage);
        }
        assert_eq!(
            seen,
            vec![
                DiscoveryStage::ProviderSearch,
                DiscoveryStage::SecondarySearch,
                DiscoveryStage::ExternalToolSearch,
                DiscoveryStage::Exhausted,
            ]
        );
        assert_eq!(DiscoveryStage::Exhausted.next(), DiscoveryStage::Exhausted);
    }

    #[test]
    fn discovery_display_limit() {
        let results = (0..20)
            .map(|i| SearchResult::new(format!("Title {i}"), format!("https://h.test/{i}")))
            .collect();
        let discovery = Discovery {
            stage: DiscoveryStage::ProviderSearch,
            results,
        };
        assert_eq!(discovery.displayed().len(), DISPLAY_LIMIT);
        assert_eq!(discovery.displayed()[0].title, "Title 0");
    }

    #[test]
    fn embed_candidate_serde_uses_snake_case_strategy() {
        let candidate = EmbedCandidate {
            url: "https://cdn.test/v.m3u8".into(),
            strategy: EmbedStrategy::DirectUrl,
        };
        let json = serde_json::to_string(&candidate).expect("serialize");
        assert!(json.contains("\"direct_url\""));
    }
}
