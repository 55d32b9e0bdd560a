//! First-seen-wins deduplication on a double key.
//!
//! A result is dropped when either its URL or its exact title has already
//! been seen. The URL key catches literal duplicate links; the title key
//! catches the same entry repeated by mirrored DOM fragments (desktop and
//! mobile lists, carousels) under slightly different hrefs.

use std::collections::HashSet;

use crate::types::SearchResult;

/// Deduplicate `results` by URL or title, preserving discovery order.
///
/// Two distinct results that happen to share a display title collide; the
/// first one wins.
pub fn dedup_by_url_or_title(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen_urls: HashSet<String> = HashSet::with_capacity(results.len());
    let mut seen_titles: HashSet<String> = HashSet::with_capacity(results.len());

    results
        .into_iter()
        .filter(|result| {
            if seen_urls.contains(&result.url) || seen_titles.contains(&result.title) {
                return false;
            }
            seen_urls.insert(result.url.clone());
            seen_titles.insert(result.title.clone());
            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(title: &str, url: &str) -> SearchResult {
        SearchResult::new(title, url)
    }

    #[test]
    fn unique_results_pass_through_in_order() {
        let results = vec![
            make_result("Inception", "https://a.test/1"),
            make_result("Interstellar", "https://a.test/2"),
            make_result("Tenet", "https://a.test/3"),
        ];
        let deduped = dedup_by_url_or_title(results.clone());
        assert_eq!(deduped, results);
    }

    #[test]
    fn duplicate_url_dropped() {
        let deduped = dedup_by_url_or_title(vec![
            make_result("Inception", "https://a.test/1"),
            make_result("Inception (2010)", "https://a.test/1"),
        ]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].title, "Inception");
    }

    #[test]
    fn duplicate_title_dropped() {
        let deduped = dedup_by_url_or_title(vec![
            make_result("Inception", "https://a.test/movie/1"),
            make_result("Inception", "https://a.test/m/1?ref=mobile"),
        ]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].url, "https://a.test/movie/1");
    }

    #[test]
    fn first_seen_wins() {
        let deduped = dedup_by_url_or_title(vec![
            make_result("B", "https://a.test/b"),
            make_result("A", "https://a.test/a"),
            make_result("B", "https://a.test/other"),
            make_result("C", "https://a.test/a"),
        ]);
        let titles: Vec<_> = deduped.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A"]);
    }

    #[test]
    fn title_matching_is_exact() {
        let deduped = dedup_by_url_or_title(vec![
            make_result("Inception", "https://a.test/1"),
            make_result("inception", "https://a.test/2"),
        ]);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn empty_input_returns_empty() {
        assert!(dedup_by_url_or_title(vec![]).is_empty());
    }
}
