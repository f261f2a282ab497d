//! Fake source fetchers for pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use image::ImageError;
use pwakit_bundle::{FetchError, SourceFetcher};
use url::Url;

use crate::fixtures::{SITE_URL, png_bytes};

/// Fetcher serving a fixed map of URL to body; unknown URLs answer `404`.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    sources: HashMap<String, Vec<u8>>,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    /// Empty fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`.
    #[must_use]
    pub fn with(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.sources.insert(url.to_string(), body.into());
        self
    }

    /// Serve PNG icons for every icon of the sample manifest plus both service worker scripts.
    ///
    /// # Errors
    ///
    /// Returns the encoder error if a fixture PNG cannot be written.
    pub fn for_sample_site(worker_url: &str, register_url: &str) -> Result<Self, ImageError> {
        let mut fetcher = Self::new();
        for edge in [192, 152, 120] {
            fetcher = fetcher.with(&format!("{SITE_URL}icons/icon-{edge}.png"), png_bytes(16)?);
        }
        Ok(fetcher
            .with(worker_url, "self.addEventListener('fetch', () => {});")
            .with(register_url, "navigator.serviceWorker.register('/serviceWorker.js');"))
    }

    /// URLs requested so far, in call order.
    #[must_use]
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|requested| requested.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SourceFetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(url.to_string());
        }
        self.sources
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Fetcher that fails every request with the given status.
#[derive(Debug, Clone, Copy)]
pub struct FailingFetcher {
    status: u16,
}

impl FailingFetcher {
    /// Fail every request with `status`.
    #[must_use]
    pub const fn new(status: u16) -> Self {
        Self { status }
    }
}

#[async_trait]
impl SourceFetcher for FailingFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Status {
            url: url.to_string(),
            status: self.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_fetcher_serves_known_urls_and_records_calls() {
        let fetcher = StaticFetcher::new().with("https://a.example/x", "x");
        let known = Url::parse("https://a.example/x").expect("valid url");
        let unknown = Url::parse("https://a.example/y").expect("valid url");

        assert_eq!(fetcher.fetch(&known).await.expect("served"), b"x");
        assert!(matches!(
            fetcher.fetch(&unknown).await,
            Err(FetchError::Status { status: 404, .. })
        ));
        assert_eq!(fetcher.requested().len(), 2);
    }

    #[tokio::test]
    async fn failing_fetcher_always_fails() {
        let url = Url::parse("https://a.example/x").expect("valid url");
        assert!(FailingFetcher::new(503).fetch(&url).await.is_err());
    }
}
