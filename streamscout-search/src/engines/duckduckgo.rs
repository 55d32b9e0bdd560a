//! DuckDuckGo secondary search.
//!
//! Used when every configured provider came back empty. Sends one query to
//! the HTML-only endpoint, biased toward public video hosts, and reads the
//! displayed result URLs.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::orchestrator::dedup::dedup_by_url_or_title;
use crate::types::{truncate_chars, SearchResult};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Characters of the displayed URL kept as a result title.
const TITLE_CHARS: usize = 60;

/// Sites the secondary query is restricted to.
const VIDEO_HOST_FILTER: &str = "site:youtube.com OR site:reddit.com";

/// DuckDuckGo HTML search, scoped to public video hosts.
pub struct DuckDuckGoEngine;

impl DuckDuckGoEngine {
    /// Extract the actual URL from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps URLs like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`.
    fn extract_url(href: &str) -> Option<String> {
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&full_href).ok()?;

        if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        } else {
            Some(full_href)
        }
    }

    /// Run the secondary search for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Timeout`] or [`SearchError::Http`] if the
    /// request fails; the caller treats either as an empty stage.
    pub async fn search(
        &self,
        client: &reqwest::Client,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let full_query = secondary_query(query);
        tracing::trace!(query = %full_query, "DuckDuckGo secondary search");

        let response = client
            .get(&config.secondary_search_url)
            .query(&[("q", full_query.as_str())])
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest("DuckDuckGo request failed", &e))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("DuckDuckGo HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::from_reqwest("DuckDuckGo response read failed", &e))?;

        tracing::trace!(bytes = html.len(), "DuckDuckGo response received");

        parse_duckduckgo_html(&html, config.secondary_max_results)
    }
}

/// The query actually sent: the user's terms scoped to video hosts.
pub fn secondary_query(query: &str) -> String {
    format!("{} watch free online {VIDEO_HOST_FILTER}", query.trim())
}

/// Parse a DuckDuckGo HTML response into results.
///
/// Each result is the displayed URL (first 60 characters) as title and the
/// unwrapped link target as URL. Ads are skipped.
pub(crate) fn parse_duckduckgo_html(
    html: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);

    let url_sel = Selector::parse("a.result__url")
        .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;

    let mut results = Vec::new();

    for element in document.select(&url_sel) {
        if is_ad(&element) {
            continue;
        }

        let text = element.text().collect::<Vec<_>>().join(" ");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            continue;
        }

        let href = match element.value().attr("href").map(str::trim) {
            Some(h) if !h.is_empty() => h,
            _ => continue,
        };

        let url = match DuckDuckGoEngine::extract_url(href) {
            Some(u) => u,
            None => continue,
        };

        results.push(SearchResult::new(truncate_chars(&text, TITLE_CHARS), url));
    }

    let mut results = dedup_by_url_or_title(results);
    results.truncate(max_results);

    tracing::debug!(count = results.len(), "DuckDuckGo results parsed");
    Ok(results)
}

fn is_ad(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|el| el.value().classes().any(|c| c == "result--ad"))
}
