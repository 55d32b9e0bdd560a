//! Result extraction from heterogeneous listing pages.
//!
//! Listing pages differ per provider, so extraction is a short-circuiting
//! cascade: an ordered list of structural selectors is tried and the first
//! one that yields accepted candidates wins. Only when no selector yields
//! anything are the raw-markup [`MarkupPattern`]s consulted. New site layouts
//! are supported by appending to [`STRUCTURAL_SELECTORS`].

use crate::orchestrator::dedup::dedup_by_url_or_title;
use crate::orchestrator::url_normalize::normalize;
use crate::patterns::MarkupPattern;
use crate::types::{truncate_chars, SearchResult};
use scraper::{ElementRef, Html, Selector};

/// Maximum results kept from one listing page.
pub const MAX_RESULTS_PER_PAGE: usize = 20;

/// Structural selectors with a short label, highest priority first.
pub const STRUCTURAL_SELECTORS: &[(&str, &str)] = &[
    ("a.film-name", "film-name"),
    ("a.title", "title"),
    ("a[href*='/watch/']", "watch link"),
    ("a[href*='/movie/']", "movie link"),
    ("a[href*='/embed/']", "embed link"),
    ("h3 a", "heading link"),
    ("div.card a", "card link"),
    ("div.film-poster a", "poster link"),
    (".mli-info a", "mli-info link"),
];

/// Lowercase title fragments that mark navigation chrome rather than content.
const NOISE_TOKENS: &[&str] = &["home", "search", "menu", "nav", "login", "sign"];

/// Accepted title length range, in characters.
const MIN_TITLE_CHARS: usize = 3;
const MAX_TITLE_CHARS: usize = 99;

/// Synthesized titles from pattern matches are cut to this many characters.
const PATTERN_TITLE_CHARS: usize = 50;

/// Options for [`extract_results`].
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Results kept after deduplication.
    pub max_results: usize,
    /// URL the markup was fetched from. When set, every extracted URL is
    /// made absolute against it before deduplication.
    pub page_url: Option<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_results: MAX_RESULTS_PER_PAGE,
            page_url: None,
        }
    }
}

impl ExtractOptions {
    /// Options for markup fetched from `page_url`.
    pub fn for_page(page_url: impl Into<String>) -> Self {
        Self {
            page_url: Some(page_url.into()),
            ..Self::default()
        }
    }
}

/// Extract (title, URL) candidates from a listing page.
///
/// Returns results in discovery order with no repeated URL and no repeated
/// title, truncated to `opts.max_results`. Never fails; a page nothing can
/// be made of yields an empty vector.
pub fn extract_results(html: &str, opts: &ExtractOptions) -> Vec<SearchResult> {
    let document = Html::parse_document(html);

    let mut candidates = structural_candidates(&document);
    if candidates.is_empty() {
        candidates = pattern_candidates(html);
    }

    if let Some(ref page_url) = opts.page_url {
        for candidate in &mut candidates {
            candidate.url = normalize(&candidate.url, page_url);
        }
    }

    let mut results = dedup_by_url_or_title(candidates);
    results.truncate(opts.max_results);
    results
}

/// Run the selector cascade; the first selector with accepted candidates wins.
fn structural_candidates(document: &Html) -> Vec<SearchResult> {
    for (selector_str, label) in STRUCTURAL_SELECTORS {
        let selector = match Selector::parse(selector_str) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(selector = selector_str, error = ?e, "invalid result selector");
                continue;
            }
        };

        let mut matched = 0usize;
        let accepted: Vec<SearchResult> = document
            .select(&selector)
            .inspect(|_| matched += 1)
            .filter_map(candidate_from_element)
            .collect();

        if matched > 0 {
            tracing::trace!(selector = label, matched, accepted = accepted.len(), "selector matched");
        }
        if !accepted.is_empty() {
            tracing::debug!(selector = label, count = accepted.len(), "structural extraction");
            return accepted;
        }
    }
    Vec::new()
}

fn candidate_from_element(element: ElementRef<'_>) -> Option<SearchResult> {
    let title = element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");
    let value = element.value();
    let url = value.attr("href").or_else(|| value.attr("src"))?.trim();

    is_acceptable(&title, url).then(|| SearchResult::new(&title, url))
}

/// Filter for structural candidates: sane title length, a real link, and no
/// navigation vocabulary in the title.
fn is_acceptable(title: &str, url: &str) -> bool {
    let len = title.chars().count();
    if !(MIN_TITLE_CHARS..=MAX_TITLE_CHARS).contains(&len) {
        return false;
    }
    if url.is_empty() || url.starts_with('#') {
        return false;
    }
    let lower = title.to_lowercase();
    !NOISE_TOKENS.iter().any(|token| lower.contains(token))
}

/// Run the raw-markup cascade; the first pattern with plausible matches wins.
fn pattern_candidates(html: &str) -> Vec<SearchResult> {
    for pattern in MarkupPattern::CASCADE {
        let hits: Vec<SearchResult> = pattern
            .find_all(html)
            .into_iter()
            .filter(|m| looks_like_link(m))
            .map(|m| SearchResult::new(pattern_title(m, pattern), m))
            .collect();

        if !hits.is_empty() {
            tracing::debug!(pattern = pattern.name(), count = hits.len(), "pattern fallback");
            return hits;
        }
    }
    Vec::new()
}

fn looks_like_link(m: &str) -> bool {
    m.starts_with("http") || m.starts_with('/') || m.starts_with('.')
}

/// Title for a pattern match: its trailing path segment, annotated with the
/// pattern name, e.g. `index.m3u8 (HLS stream)`.
fn pattern_title(m: &str, pattern: MarkupPattern) -> String {
    let segment = match m.rsplit('/').next() {
        Some(s) if !s.is_empty() => s,
        _ => m,
    };
    format!(
        "{} ({})",
        truncate_chars(segment, PATTERN_TITLE_CHARS),
        pattern.name()
    )
}
