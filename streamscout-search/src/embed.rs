//! Embed resolution: from a detail page to a single playable URL.
//!
//! A detail page is fetched once and a fixed cascade of strategies is run
//! over it, from the most specific (iframes inside known player containers)
//! to the most generic (raw-markup patterns). The first hit wins and is
//! returned as an absolute URL.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::orchestrator::url_normalize::{has_http_scheme, normalize};
use crate::patterns::{find_direct_media_url, MarkupPattern};
use crate::types::{EmbedCandidate, EmbedStrategy};
use scraper::{Html, Selector};

/// Iframes inside known player containers, or with a player-ish `src`.
const PLAYER_SELECTORS: &[&str] = &[
    ".player-container iframe",
    "#player iframe",
    "#watch-iframe iframe",
    "iframe[src*='embed']",
    "iframe[src*='player']",
    "iframe[src*='watch']",
];

/// Keywords that make an arbitrary iframe `src` worth following.
const IFRAME_KEYWORDS: &[&str] = &["embed", "player", "watch", "vid", "m3u8", "mp4"];

/// Substrings that mark a `<source>` inside `<video>` as a stream.
const SOURCE_KEYWORDS: &[&str] = &[".mp4", ".m3u8", "stream"];

/// Fetches detail pages and resolves them to an [`EmbedCandidate`].
#[derive(Debug, Clone)]
pub struct EmbedResolver {
    client: reqwest::Client,
}

impl EmbedResolver {
    /// Build a resolver with its own client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configuration is invalid.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            client: http::build_client(config)?,
        })
    }

    /// Build a resolver sharing an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Resolve `page_url` to a single embed or media URL.
    ///
    /// A relative `page_url` is joined onto `base_url`; with no base the call
    /// returns `None` without touching the network. Fetch failures of any
    /// kind are logged and also yield `None`.
    pub async fn resolve(&self, page_url: &str, base_url: Option<&str>) -> Option<EmbedCandidate> {
        let page_url = absolute_page_url(page_url, base_url)?;

        tracing::trace!(url = %page_url, "fetching detail page");
        let html = match http::fetch_text(&self.client, &page_url).await {
            Ok(html) => html,
            Err(err) => {
                tracing::warn!(url = %page_url, error = %err, "could not fetch detail page");
                return None;
            }
        };

        let found = find_embed(&html, &page_url);
        match found {
            Some(ref candidate) => {
                tracing::debug!(strategy = %candidate.strategy, url = %candidate.url, "embed found");
            }
            None => tracing::debug!(url = %page_url, "no embed found on detail page"),
        }
        found
    }
}

/// Join a relative detail-page URL onto `base_url`.
fn absolute_page_url(page_url: &str, base_url: Option<&str>) -> Option<String> {
    if has_http_scheme(page_url) {
        return Some(page_url.to_owned());
    }
    let base = base_url.filter(|b| !b.trim().is_empty())?;
    Some(format!(
        "{}/{}",
        base.trim_end_matches('/'),
        page_url.trim_start_matches('/')
    ))
}

/// Run the embed cascade over already-fetched markup.
///
/// Every returned URL is made absolute against `page_url`.
pub fn find_embed(html: &str, page_url: &str) -> Option<EmbedCandidate> {
    let document = Html::parse_document(html);

    let hit = player_iframe(&document)
        .map(|src| (src, EmbedStrategy::PlayerContainer))
        .or_else(|| keyword_iframe(&document).map(|src| (src, EmbedStrategy::KeywordIframe)))
        .or_else(|| video_src(&document).map(|src| (src, EmbedStrategy::VideoTag)))
        .or_else(|| video_source(&document).map(|src| (src, EmbedStrategy::VideoSource)))
        .or_else(|| find_direct_media_url(html).map(|u| (u.to_owned(), EmbedStrategy::DirectUrl)))
        .or_else(|| pattern_url(html).map(|u| (u, EmbedStrategy::Pattern)))?;

    let (raw, strategy) = hit;
    Some(EmbedCandidate {
        url: normalize(&raw, page_url),
        strategy,
    })
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::warn!(selector, error = ?e, "invalid embed selector");
            None
        }
    }
}

/// First non-empty `src` among elements matching `selector`.
fn first_src(document: &Html, selector: &str, accept: impl Fn(&str) -> bool) -> Option<String> {
    let selector = parse_selector(selector)?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("src"))
        .map(str::trim)
        .find(|src| !src.is_empty() && accept(src))
        .map(str::to_owned)
}

fn player_iframe(document: &Html) -> Option<String> {
    PLAYER_SELECTORS
        .iter()
        .find_map(|selector| first_src(document, selector, |_| true))
}

fn keyword_iframe(document: &Html) -> Option<String> {
    first_src(document, "iframe", |src| {
        let lower = src.to_lowercase();
        IFRAME_KEYWORDS.iter().any(|k| lower.contains(k))
    })
}

fn video_src(document: &Html) -> Option<String> {
    first_src(document, "video", |_| true)
}

fn video_source(document: &Html) -> Option<String> {
    first_src(document, "video source", |src| {
        let lower = src.to_lowercase();
        SOURCE_KEYWORDS.iter().any(|k| lower.contains(k))
    })
}

/// Last resort: the shared markup patterns. Only the first match of each
/// pattern is considered, and it must be absolute.
fn pattern_url(html: &str) -> Option<String> {
    MarkupPattern::CASCADE.iter().find_map(|pattern| {
        pattern
            .find_first(html)
            .filter(|m| m.starts_with("http"))
            .map(str::to_owned)
    })
}
