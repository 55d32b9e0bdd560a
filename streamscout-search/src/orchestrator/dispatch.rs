//! Query dispatch: one query, every provider, concurrently.
//!
//! Each provider base URL is completed with the encoded query, fetched, and
//! run through the result extractor. A provider that times out, errors, or
//! serves unusable markup contributes nothing; the others are unaffected.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::extract::{extract_results, ExtractOptions};
use crate::http;
use crate::types::SearchResult;

/// Encode `query` for appending to a provider search base.
///
/// Spaces become `+` first and the result is then percent-encoded, so the
/// `+` itself goes out as `%2B`. Several listing sites rely on exactly this
/// shape. `/` is left as a path separator.
pub fn encode_query(query: &str) -> String {
    urlencoding::encode(&query.trim().replace(' ', "+")).replace("%2F", "/")
}

/// Search every provider in `providers` for `query`.
///
/// Providers are fetched concurrently; the combined results keep provider
/// order (all of provider 1, then all of provider 2, ...). No deduplication
/// happens across providers.
pub async fn dispatch(
    client: &reqwest::Client,
    query: &str,
    providers: &[String],
    config: &SearchConfig,
) -> Vec<SearchResult> {
    let encoded = encode_query(query);

    let futures: Vec<_> = providers
        .iter()
        .map(|base| {
            let url = format!("{base}{encoded}");
            async move {
                let outcome = search_provider(client, &url, config).await;
                (url, outcome)
            }
        })
        .collect();

    let outcomes = futures::future::join_all(futures).await;

    let mut all_results = Vec::new();
    for (url, outcome) in outcomes {
        match outcome {
            Ok(results) => {
                tracing::debug!(provider = %url, count = results.len(), "provider returned results");
                all_results.extend(results);
            }
            Err(err) => {
                tracing::warn!(provider = %url, error = %err, "provider search failed");
            }
        }
    }

    all_results
}

async fn search_provider(
    client: &reqwest::Client,
    url: &str,
    config: &SearchConfig,
) -> Result<Vec<SearchResult>, SearchError> {
    tracing::trace!(url, "querying provider");
    let html = http::fetch_text(client, url).await?;
    let opts = ExtractOptions {
        max_results: config.max_results_per_provider,
        ..ExtractOptions::for_page(url)
    };
    Ok(extract_results(&html, &opts))
}
