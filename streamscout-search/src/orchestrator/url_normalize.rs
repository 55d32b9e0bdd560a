//! URL normalisation for extracted links.
//!
//! Provider pages and detail pages hand out links in every shape: absolute,
//! protocol-relative, root-relative, and document-relative. [`normalize`]
//! turns any of them into an absolute URL against the page they came from.

use url::{Position, Url};

/// Resolve `raw` against `page_url`.
///
/// 1. `http://` / `https://` URLs are returned unchanged.
/// 2. Protocol-relative `//host/path` gets an `https:` prefix.
/// 3. Root-relative `/path` is joined to the scheme, host, and port of `page_url`.
/// 4. Anything else is resolved with standard relative-URL rules.
///
/// Never fails: if `page_url` cannot be parsed, the two strings are joined
/// as best effort.
///
/// # Examples
///
/// ```
/// use streamscout_search::orchestrator::url_normalize::normalize;
///
/// assert_eq!(normalize("/a/b", "https://h.test/x"), "https://h.test/a/b");
/// assert_eq!(normalize("//cdn.test/v", "https://h.test/x"), "https://cdn.test/v");
/// ```
pub fn normalize(raw: &str, page_url: &str) -> String {
    let raw = raw.trim();

    if has_http_scheme(raw) {
        return raw.to_owned();
    }

    if raw.starts_with("//") {
        return format!("https:{raw}");
    }

    let Ok(base) = Url::parse(page_url) else {
        return best_effort_join(raw, page_url);
    };

    if raw.starts_with('/') {
        return format!("{}{raw}", &base[..Position::BeforePath]);
    }

    base.join(raw)
        .map(String::from)
        .unwrap_or_else(|_| best_effort_join(raw, page_url))
}

/// Scheme, host, and port of `page_url` (e.g. `https://h.test:8080`).
///
/// Returns `None` for unparseable or host-less URLs.
pub fn origin(page_url: &str) -> Option<String> {
    let parsed = Url::parse(page_url).ok()?;
    parsed.host_str()?;
    Some(parsed[..Position::BeforePath].to_owned())
}

/// Returns `true` if `raw` starts with `http://` or `https://` (any case).
pub(crate) fn has_http_scheme(raw: &str) -> bool {
    let lower = raw.get(..8).unwrap_or(raw).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn best_effort_join(raw: &str, page_url: &str) -> String {
    if page_url.is_empty() {
        return raw.to_owned();
    }
    format!(
        "{}/{}",
        page_url.trim_end_matches('/'),
        raw.trim_start_matches('/')
    )
}
