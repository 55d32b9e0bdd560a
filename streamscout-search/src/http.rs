//! Shared HTTP client with User-Agent rotation and optional proxy.
//!
//! Provides a configured [`reqwest::Client`] with browser-like headers,
//! cookie support, and rotating User-Agent strings so provider pages serve
//! their regular markup instead of bot-detection walls.

use crate::config::SearchConfig;
use crate::error::SearchError;
use rand::seq::SliceRandom;
use std::time::Duration;

/// Realistic browser User-Agent strings, one picked per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build a [`reqwest::Client`] configured for provider scraping.
///
/// The client has:
/// - Cookie store enabled (consent and session cookies on listing sites)
/// - Timeout from config
/// - Random User-Agent from built-in rotation list (or custom if configured)
/// - The configured proxy, if any, for both HTTP and HTTPS
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Config`] for an unusable proxy URL and
/// [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    };

    let mut builder = reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10));

    if let Some(ref proxy) = config.proxy {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| SearchError::Config(format!("invalid proxy {proxy}: {e}")))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // SAFETY: USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// GET `url` and return the body of a successful response.
///
/// Non-2xx statuses are errors; timeouts map to [`SearchError::Timeout`].
pub(crate) async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String, SearchError> {
    let response = client
        .get(url)
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| SearchError::from_reqwest("request failed", &e))?
        .error_for_status()
        .map_err(|e| SearchError::Http(format!("bad status: {e}")))?;

    response
        .text()
        .await
        .map_err(|e| SearchError::from_reqwest("response read failed", &e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn random_user_agent_returns_valid_ua() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
        assert!(ua.contains("Mozilla/5.0"));
    }

    #[test]
    fn build_client_with_default_config() {
        assert!(build_client(&SearchConfig::default()).is_ok());
    }

    #[test]
    fn build_client_with_proxy() {
        let config = SearchConfig {
            proxy: Some("http://127.0.0.1:8080".into()),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }

    #[tokio::test]
    async fn fetch_text_sends_custom_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("user-agent", "CustomBot/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let config = SearchConfig {
            user_agent: Some("CustomBot/1.0".into()),
            ..Default::default()
        };
        let client = build_client(&config).expect("client");
        let body = fetch_text(&client, &format!("{}/page", server.uri()))
            .await
            .expect("fetch should succeed");
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn fetch_text_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = build_client(&SearchConfig::default()).expect("client");
        let err = fetch_text(&client, &server.uri()).await.unwrap_err();
        assert!(matches!(err, SearchError::Http(_)), "got {err:?}");
    }
}
