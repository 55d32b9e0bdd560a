//! Provider health probing.
//!
//! A probe is a single HEAD request with its own time budget. Probes never
//! fail: every outcome, including timeouts and connection errors, becomes a
//! [`HealthRecord`].

use crate::types::HealthRecord;
use futures::future::join_all;
use std::time::{Duration, Instant};

/// Shortest probe budget accepted.
pub const MIN_PROBE_TIMEOUT_SECS: u64 = 2;

/// Longest probe budget accepted.
pub const MAX_PROBE_TIMEOUT_SECS: u64 = 10;

/// Clamp a requested probe timeout into the supported range.
pub fn clamp_probe_timeout(seconds: u64) -> Duration {
    Duration::from_secs(seconds.clamp(MIN_PROBE_TIMEOUT_SECS, MAX_PROBE_TIMEOUT_SECS))
}

/// Probe `url` with a HEAD request bounded by `timeout`.
///
/// - success with status < 400: reachable, measured elapsed
/// - status >= 400: unreachable, measured elapsed
/// - timeout: unreachable, elapsed equal to `timeout`
/// - any other failure: unreachable, elapsed 0
pub async fn probe(client: &reqwest::Client, url: &str, timeout: Duration) -> HealthRecord {
    tracing::trace!(url, "probing provider");
    let start = Instant::now();

    let outcome = tokio::time::timeout(timeout, client.head(url).timeout(timeout).send()).await;

    let (reachable, elapsed_seconds) = match outcome {
        Ok(Ok(response)) => {
            let status = response.status();
            let elapsed = start.elapsed().as_secs_f64();
            tracing::debug!(url, status = status.as_u16(), elapsed, "probe answered");
            (status.as_u16() < 400, elapsed)
        }
        Ok(Err(e)) if e.is_timeout() => {
            tracing::debug!(url, "probe timed out");
            (false, timeout.as_secs_f64())
        }
        Ok(Err(e)) => {
            tracing::debug!(url, error = %e, "probe failed");
            (false, 0.0)
        }
        Err(_) => {
            tracing::debug!(url, "probe timed out");
            (false, timeout.as_secs_f64())
        }
    };

    HealthRecord {
        url: url.to_owned(),
        reachable,
        elapsed_seconds,
    }
}

/// Probe every URL concurrently; records come back in input order.
pub async fn probe_all(
    client: &reqwest::Client,
    urls: &[String],
    timeout: Duration,
) -> Vec<HealthRecord> {
    join_all(urls.iter().map(|url| probe(client, url, timeout))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::http::build_client;
    use crate::types::HealthStatus;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> reqwest::Client {
        build_client(&SearchConfig::default()).expect("client")
    }

    #[test]
    fn timeout_is_clamped() {
        assert_eq!(clamp_probe_timeout(0), Duration::from_secs(2));
        assert_eq!(clamp_probe_timeout(5), Duration::from_secs(5));
        assert_eq!(clamp_probe_timeout(60), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn healthy_provider() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let url = format!("{}/search", server.uri());
        let record = probe(&client(), &url, Duration::from_secs(2)).await;
        assert!(record.reachable);
        assert_eq!(record.url, url);
        assert!(record.elapsed_seconds < 2.0);
        assert_eq!(record.status(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn error_status_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let record = probe(&client(), &server.uri(), Duration::from_secs(2)).await;
        assert!(!record.reachable);
        assert_eq!(record.status(), HealthStatus::Dead);
    }

    #[tokio::test]
    async fn no_content_status_is_reachable() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let record = probe(&client(), &server.uri(), Duration::from_secs(2)).await;
        assert!(record.reachable);
    }

    #[tokio::test]
    async fn unresponsive_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let record = probe(&client(), &server.uri(), Duration::from_secs(2)).await;
        assert!(!record.reachable);
        assert!((record.elapsed_seconds - 2.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn connection_failure_reports_zero_elapsed() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let record = probe(&client(), "http://127.0.0.1:9/", Duration::from_secs(2)).await;
        assert!(!record.reachable);
        assert_eq!(record.elapsed_seconds, 0.0);
    }

    #[tokio::test]
    async fn probe_all_preserves_order() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/fast"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let urls = vec![
            format!("{}/slow", server.uri()),
            format!("{}/fast", server.uri()),
            format!("{}/missing", server.uri()),
        ];
        let records = probe_all(&client(), &urls, Duration::from_secs(2)).await;
        let got: Vec<_> = records.iter().map(|r| (r.url.as_str(), r.reachable)).collect();
        assert_eq!(
            got,
            vec![
                (urls[0].as_str(), true),
                (urls[1].as_str(), true),
                (urls[2].as_str(), false),
            ]
        );
    }
}
