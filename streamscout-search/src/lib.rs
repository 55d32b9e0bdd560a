//! # streamscout-search
//!
//! Multi-source media discovery: from a free-text title to a playable URL.
//!
//! This crate scrapes a configurable set of provider listing pages, pulls
//! (title, URL) candidates out of whatever markup they serve, and falls back
//! to progressively more generic sources when the providers come up empty.
//! Once the user has picked a result, the embed resolver follows it to a
//! single playable stream or embed URL.
//!
//! ## Design
//!
//! - Providers are queried concurrently; one slow or broken provider never
//!   blocks or fails the others
//! - Extraction is a selector cascade with a raw-markup fallback, so new
//!   site layouts are handled by appending to an ordered list
//! - Discovery is a linear fallback chain: providers, then a web search
//!   scoped to public video hosts, then an external media-search tool
//! - No shared mutable state: the client and [`SearchConfig`] are built once
//!   and passed down explicitly
//!
//! ## Privacy
//!
//! - Queries are logged only at trace level
//! - No cross-call cache; nothing is persisted

pub mod config;
pub mod embed;
pub mod engines;
pub mod error;
pub mod extract;
pub mod health;
pub mod http;
pub mod orchestrator;
pub mod patterns;
pub mod tool;
pub mod types;

pub use config::SearchConfig;
pub use embed::EmbedResolver;
pub use error::{Result, SearchError};
pub use extract::{extract_results, ExtractOptions};
pub use orchestrator::url_normalize::normalize;
pub use orchestrator::FallbackOrchestrator;
pub use tool::{MediaSearchTool, YtDlpTool};
pub use types::{
    Discovery, DiscoveryStage, EmbedCandidate, EmbedStrategy, HealthRecord, HealthStatus,
    SearchResult,
};

/// Discover results for `query` across `providers`, falling back to a web
/// search and then `yt-dlp`.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for an invalid configuration or an empty
/// provider list, and [`SearchError::Exhausted`] when every source came up
/// empty. Individual provider failures are logged, never returned.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> streamscout_search::Result<()> {
/// let config = streamscout_search::SearchConfig::default();
/// let providers = vec!["https://listing.example/search?keyword=".to_string()];
/// let found = streamscout_search::discover("the matrix", &providers, &config).await?;
/// for result in found.displayed() {
///     println!("{}: {}", result.title, result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn discover(
    query: &str,
    providers: &[String],
    config: &SearchConfig,
) -> Result<Discovery> {
    FallbackOrchestrator::from_config(config.clone())?
        .discover(query, providers)
        .await
}

/// Resolve a detail page to a single embed or stream URL.
///
/// Returns `None` when the page cannot be fetched or contains nothing
/// playable. A relative `page_url` needs `base_url`.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid.
pub async fn resolve_embed(
    page_url: &str,
    base_url: Option<&str>,
    config: &SearchConfig,
) -> Result<Option<EmbedCandidate>> {
    let resolver = EmbedResolver::new(config)?;
    Ok(resolver.resolve(page_url, base_url).await)
}

/// Probe each URL with a HEAD request, concurrently, in input order.
///
/// `timeout_seconds` is clamped to the supported probe range.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid.
pub async fn probe_providers(
    urls: &[String],
    timeout_seconds: u64,
    config: &SearchConfig,
) -> Result<Vec<HealthRecord>> {
    config.validate()?;
    let client = http::build_client(config)?;
    let timeout = health::clamp_probe_timeout(timeout_seconds);
    Ok(health::probe_all(&client, urls, timeout).await)
}
