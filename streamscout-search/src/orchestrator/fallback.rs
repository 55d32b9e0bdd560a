//! The discovery fallback chain.
//!
//! ```text
//! ProviderSearch → SecondarySearch → ExternalToolSearch → Exhausted
//! ```
//!
//! Each stage runs only if every earlier stage produced nothing. A stage
//! that fails is logged and treated as empty; the only negative outcome a
//! caller sees is [`SearchError::Exhausted`] (or [`SearchError::Cancelled`]
//! when the caller gives up first).

use crate::config::SearchConfig;
use crate::engines::DuckDuckGoEngine;
use crate::error::SearchError;
use crate::http;
use crate::tool::{MediaSearchTool, YtDlpTool};
use crate::types::{Discovery, DiscoveryStage, SearchResult};
use tokio_util::sync::CancellationToken;

use super::dispatch::dispatch;

/// Runs the fallback chain for one query at a time.
///
/// Holds no per-query state, so a single orchestrator can serve many
/// sequential or concurrent discovery calls.
#[derive(Debug)]
pub struct FallbackOrchestrator<T: MediaSearchTool = YtDlpTool> {
    config: SearchConfig,
    client: reqwest::Client,
    tool: T,
}

impl FallbackOrchestrator<YtDlpTool> {
    /// Orchestrator using `yt-dlp` as the external media-search tool.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid.
    pub fn from_config(config: SearchConfig) -> Result<Self, SearchError> {
        let tool = YtDlpTool::new(&config);
        Self::new(config, tool)
    }
}

impl<T: MediaSearchTool> FallbackOrchestrator<T> {
    /// Build an orchestrator with a custom external tool.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid.
    pub fn new(config: SearchConfig, tool: T) -> Result<Self, SearchError> {
        config.validate()?;
        let client = http::build_client(&config)?;
        Ok(Self {
            config,
            client,
            tool,
        })
    }

    /// The HTTP client shared by every stage.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Discover results for `query` across `providers`.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Config`] if `providers` is empty or `query` is blank
    /// - [`SearchError::Exhausted`] if every stage came back empty
    pub async fn discover(
        &self,
        query: &str,
        providers: &[String],
    ) -> Result<Discovery, SearchError> {
        self.discover_with_cancel(query, providers, &CancellationToken::new())
            .await
    }

    /// Like [`discover`](Self::discover), abandoning all outstanding work as
    /// soon as `cancel` fires.
    ///
    /// # Errors
    ///
    /// As [`discover`](Self::discover), plus [`SearchError::Cancelled`].
    pub async fn discover_with_cancel(
        &self,
        query: &str,
        providers: &[String],
        cancel: &CancellationToken,
    ) -> Result<Discovery, SearchError> {
        if providers.is_empty() {
            return Err(SearchError::Config("no providers configured".into()));
        }
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::Config("query must not be empty".into()));
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("discovery cancelled");
                Err(SearchError::Cancelled)
            }
            outcome = self.run_chain(query, providers) => outcome,
        }
    }

    async fn run_chain(&self, query: &str, providers: &[String]) -> Result<Discovery, SearchError> {
        tracing::trace!(query, providers = providers.len(), "starting discovery");
        let mut stage = DiscoveryStage::ProviderSearch;

        while stage != DiscoveryStage::Exhausted {
            tracing::info!(%stage, "trying discovery stage");
            let results = self.run_stage(stage, query, providers).await;
            if !results.is_empty() {
                tracing::info!(%stage, count = results.len(), "discovery succeeded");
                return Ok(Discovery { stage, results });
            }
            tracing::info!(%stage, "stage came back empty");
            stage = stage.next();
        }

        Err(SearchError::Exhausted(format!(
            "nothing found for '{query}' from providers, web search, or {}",
            self.tool.name()
        )))
    }

    async fn run_stage(
        &self,
        stage: DiscoveryStage,
        query: &str,
        providers: &[String],
    ) -> Vec<SearchResult> {
        match stage {
            DiscoveryStage::ProviderSearch => {
                dispatch(&self.client, query, providers, &self.config).await
            }
            DiscoveryStage::SecondarySearch => {
                match DuckDuckGoEngine
                    .search(&self.client, query, &self.config)
                    .await
                {
                    Ok(results) => results,
                    Err(err) => {
                        tracing::warn!(error = %err, "secondary search failed");
                        Vec::new()
                    }
                }
            }
            DiscoveryStage::ExternalToolSearch => match self.tool.find_stream(query).await {
                Ok(Some(url)) => {
                    vec![SearchResult::new(
                        format!("{query} ({})", self.tool.name()),
                        url,
                    )]
                }
                Ok(None) => Vec::new(),
                Err(err) => {
                    tracing::warn!(tool = self.tool.name(), error = %err, "media-search tool failed");
                    Vec::new()
                }
            },
            DiscoveryStage::Exhausted => Vec::new(),
        }
    }
}
