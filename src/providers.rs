//! Provider list management.
//!
//! The provider list is a small JSON document with three string lists. It
//! is resolved in priority order: the local copy in the config directory,
//! then the published remote list, then built-in defaults. Whatever is
//! resolved is written back locally so later runs start offline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, StreamError};

/// The provider configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSet {
    /// Listing-page search prefixes; the encoded query is appended.
    #[serde(default)]
    pub movie_search_bases: Vec<String>,
    /// Search prefixes for legal, free-to-watch sources.
    #[serde(default)]
    pub legal_search_bases: Vec<String>,
    /// Embed host names known to serve playable media.
    #[serde(default)]
    pub embed_fallbacks: Vec<String>,
}

impl Default for ProviderSet {
    fn default() -> Self {
        Self {
            movie_search_bases: vec![
                "https://fmovies.to/search?keyword=".into(),
                "https://www.123movies.co/search/".into(),
            ],
            legal_search_bases: vec![
                "https://archive.org/search?query=".into(),
                "https://tubitv.com/search/".into(),
            ],
            embed_fallbacks: vec![
                "mycloud".into(),
                "upstream".into(),
                "vidcloud".into(),
                "streamwish".into(),
            ],
        }
    }
}

impl ProviderSet {
    /// The search bases to use: legal sources only, or the general list.
    pub fn search_bases(&self, legal_only: bool) -> &[String] {
        if legal_only {
            &self.legal_search_bases
        } else {
            &self.movie_search_bases
        }
    }

    /// Problems with this document, one message each. Empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.movie_search_bases.is_empty() {
            problems.push("movie_search_bases is empty".to_owned());
        }
        for (field, bases) in [
            ("movie_search_bases", &self.movie_search_bases),
            ("legal_search_bases", &self.legal_search_bases),
        ] {
            for (i, base) in bases.iter().enumerate() {
                if !is_http_url(base) {
                    problems.push(format!("{field}[{i}] is not an http(s) URL: {base}"));
                }
            }
        }
        for (i, host) in self.embed_fallbacks.iter().enumerate() {
            if host.trim().is_empty() {
                problems.push(format!("embed_fallbacks[{i}] is empty"));
            }
        }

        problems
    }
}

fn is_http_url(raw: &str) -> bool {
    url::Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

/// Where a loaded [`ProviderSet`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderSource {
    /// The local `providers.json`.
    LocalFile,
    /// The remote published list.
    Remote,
    /// Built-in defaults.
    Defaults,
}

/// Loads, caches, and refreshes the provider list.
#[derive(Debug)]
pub struct ProviderManager {
    providers_file: PathBuf,
    remote_url: String,
    client: reqwest::Client,
    loaded: Option<(ProviderSet, ProviderSource)>,
}

impl ProviderManager {
    /// Create a manager backed by `providers_file`, refreshing from
    /// `remote_url` with `client`.
    pub fn new(
        providers_file: impl Into<PathBuf>,
        remote_url: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            providers_file: providers_file.into(),
            remote_url: remote_url.into(),
            client,
            loaded: None,
        }
    }

    /// Path of the local provider list.
    pub fn providers_file(&self) -> &Path {
        &self.providers_file
    }

    /// URL of the remote provider list.
    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }

    /// Resolve the provider list, at most once per manager.
    ///
    /// Never fails: a broken local file falls through to the remote list,
    /// and an unreachable remote falls through to the defaults.
    pub async fn load(&mut self) -> (&ProviderSet, ProviderSource) {
        let resolved = match self.loaded.take() {
            Some(loaded) => loaded,
            None => self.resolve().await,
        };
        let (set, source) = self.loaded.insert(resolved);
        (&*set, *source)
    }

    async fn resolve(&self) -> (ProviderSet, ProviderSource) {
        match self.read_local() {
            Ok(Some(set)) => {
                tracing::info!(path = %self.providers_file.display(), "loaded providers");
                return (set, ProviderSource::LocalFile);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(path = %self.providers_file.display(), error = %e, "ignoring unreadable provider file");
            }
        }

        let (set, source) = match self.fetch_remote().await {
            Ok(set) => {
                tracing::info!(url = %self.remote_url, "downloaded providers");
                (set, ProviderSource::Remote)
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not fetch remote providers, using defaults");
                (ProviderSet::default(), ProviderSource::Defaults)
            }
        };

        if let Err(e) = self.save(&set) {
            tracing::warn!(error = %e, "could not save providers");
        }
        (set, source)
    }

    /// Force a refresh from the remote list and store it locally.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Provider`] if the remote list cannot be
    /// fetched or parsed, or an I/O error if it cannot be saved. The
    /// previously loaded list is kept on failure.
    pub async fn update(&mut self) -> Result<&ProviderSet> {
        let set = self.fetch_remote().await?;
        self.save(&set)?;
        tracing::info!(url = %self.remote_url, "providers updated");
        let (set, _) = self.loaded.insert((set, ProviderSource::Remote));
        Ok(&*set)
    }

    fn read_local(&self) -> Result<Option<ProviderSet>> {
        if !self.providers_file.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.providers_file)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn fetch_remote(&self) -> Result<ProviderSet> {
        let response = self
            .client
            .get(&self.remote_url)
            .send()
            .await
            .map_err(|e| StreamError::Provider(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| StreamError::Provider(format!("bad status: {e}")))?;

        response
            .json::<ProviderSet>()
            .await
            .map_err(|e| StreamError::Provider(format!("invalid provider list: {e}")))
    }

    fn save(&self, set: &ProviderSet) -> Result<()> {
        if let Some(parent) = self.providers_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.providers_file, serde_json::to_string_pretty(set)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(2))
            .build()
            .expect("client")
    }

    fn remote_set() -> ProviderSet {
        ProviderSet {
            movie_search_bases: vec!["https://remote.test/search?q=".into()],
            legal_search_bases: vec![],
            embed_fallbacks: vec!["remotecloud".into()],
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(ProviderSet::default().validate().is_empty());
    }

    #[test]
    fn validate_reports_each_problem() {
        let set = ProviderSet {
            movie_search_bases: vec![],
            legal_search_bases: vec!["ftp://files.test/".into(), "https://ok.test/?q=".into()],
            embed_fallbacks: vec!["vidcloud".into(), "  ".into()],
        };
        assert_eq!(
            set.validate(),
            vec![
                "movie_search_bases is empty".to_owned(),
                "legal_search_bases[0] is not an http(s) URL: ftp://files.test/".to_owned(),
                "embed_fallbacks[1] is empty".to_owned(),
            ]
        );
    }

    #[test]
    fn search_bases_selects_list() {
        let set = ProviderSet::default();
        assert_eq!(set.search_bases(false), set.movie_search_bases.as_slice());
        assert_eq!(set.search_bases(true), set.legal_search_bases.as_slice());
    }

    #[test]
    fn missing_keys_default_to_empty() {
        let set: ProviderSet =
            serde_json::from_str(r#"{"movie_search_bases": ["https://a.test/s/"]}"#).expect("parse");
        assert_eq!(set.movie_search_bases.len(), 1);
        assert!(set.legal_search_bases.is_empty());
        assert!(set.embed_fallbacks.is_empty());
    }

    #[tokio::test]
    async fn local_file_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("providers.json");
        std::fs::write(&file, serde_json::to_string(&remote_set()).expect("json")).expect("write");

        // Remote URL is unreachable; it must not be consulted.
        let mut manager = ProviderManager::new(&file, "http://127.0.0.1:9/providers.json", client());
        let (set, source) = manager.load().await;
        assert_eq!(source, ProviderSource::LocalFile);
        assert_eq!(set, &remote_set());
    }

    #[tokio::test]
    async fn remote_used_and_saved_without_local_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/providers.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(remote_set()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("cfg").join("providers.json");
        let mut manager =
            ProviderManager::new(&file, format!("{}/providers.json", server.uri()), client());

        let (set, source) = manager.load().await;
        assert_eq!(source, ProviderSource::Remote);
        assert_eq!(set, &remote_set());

        // Second load is served from memory.
        let (_, source) = manager.load().await;
        assert_eq!(source, ProviderSource::Remote);

        let saved: ProviderSet =
            serde_json::from_str(&std::fs::read_to_string(&file).expect("saved")).expect("json");
        assert_eq!(saved, remote_set());
    }

    #[tokio::test]
    async fn corrupt_local_file_falls_back_to_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("providers.json");
        std::fs::write(&file, "{ not json").expect("write");

        let mut manager =
            ProviderManager::new(&file, format!("{}/providers.json", server.uri()), client());
        let (set, source) = manager.load().await;
        assert_eq!(source, ProviderSource::Defaults);
        assert_eq!(set, &ProviderSet::default());

        let saved: ProviderSet =
            serde_json::from_str(&std::fs::read_to_string(&file).expect("saved")).expect("json");
        assert_eq!(saved, ProviderSet::default());
    }

    #[tokio::test]
    async fn update_replaces_local_copy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(remote_set()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("providers.json");
        std::fs::write(&file, serde_json::to_string(&ProviderSet::default()).expect("json"))
            .expect("write");

        let mut manager =
            ProviderManager::new(&file, format!("{}/providers.json", server.uri()), client());
        let updated = manager.update().await.expect("update").clone();
        assert_eq!(updated, remote_set());

        let (_, source) = manager.load().await;
        assert_eq!(source, ProviderSource::Remote);
        let saved: ProviderSet =
            serde_json::from_str(&std::fs::read_to_string(&file).expect("saved")).expect("json");
        assert_eq!(saved, remote_set());
    }

    #[tokio::test]
    async fn update_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("providers.json");
        let mut manager =
            ProviderManager::new(&file, format!("{}/providers.json", server.uri()), client());
        let err = manager.update().await.unwrap_err();
        assert!(matches!(err, StreamError::Provider(_)), "got {err:?}");
        assert!(!file.exists());
    }
}
