//! Remote byte acquisition.
//!
//! # Design
//! - Producers depend on the `SourceFetcher` trait only; tests swap in fakes.
//! - The HTTP implementation applies one timeout to the whole request.
//! - Bodies are read chunk by chunk and refused once they pass `max_bytes`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::error::FetchError;

/// Source of remote bytes for icons and scripts.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch the full body at `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] for transport failures, timeouts and
    /// non-success statuses.
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpFetcher {
    /// Build a fetcher whose requests are bounded by `timeout` and whose
    /// bodies may not exceed `max_bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] when the TLS backend cannot be initialised.
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pwakit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| FetchError::Client { source })?;
        Ok(Self { client, max_bytes })
    }

    fn too_large(&self, url: &Url) -> FetchError {
        FetchError::TooLarge {
            url: url.to_string(),
            limit: self.max_bytes,
        }
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::transport(url, source))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let limit = u64::try_from(self.max_bytes).unwrap_or(u64::MAX);
        let declared = response.content_length();
        if declared.is_some_and(|length| length > limit) {
            return Err(self.too_large(url));
        }

        let capacity = declared.map_or(0, |length| usize::try_from(length).unwrap_or(0));
        let mut body = Vec::with_capacity(capacity);
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|source| FetchError::transport(url, source))?
        {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(self.too_large(url));
            }
            body.extend_from_slice(&chunk);
        }
        debug!(url = %url, bytes = body.len(), "fetched source");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const LIMIT: usize = 1024;

    async fn serve_once(status_line: &'static str, body: &'static str) -> std::io::Result<Url> {
        serve_raw(format!(
            "HTTP/1.1 {status_line}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        ))
        .await
    }

    /// Answers with a body whose length is only known at connection close.
    async fn serve_unsized(body: String) -> std::io::Result<Url> {
        serve_raw(format!("HTTP/1.1 200 OK\r\nconnection: close\r\n\r\n{body}")).await
    }

    async fn serve_raw(response: String) -> std::io::Result<Url> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buffer = [0_u8; 1024];
                let _ = socket.read(&mut buffer).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        Url::parse(&format!("http://{addr}/sw.js"))
            .map_err(|err| std::io::Error::other(err.to_string()))
    }

    #[tokio::test]
    async fn fetch_returns_body_on_success() -> Result<(), Box<dyn Error>> {
        let url = serve_once("200 OK", "self.addEventListener('fetch', () => {});").await?;
        let fetcher = HttpFetcher::new(Duration::from_secs(5), LIMIT)?;
        let body = fetcher.fetch(&url).await?;
        assert!(body.starts_with(b"self.addEventListener"));
        Ok(())
    }

    #[tokio::test]
    async fn fetch_reports_unsuccessful_status() -> Result<(), Box<dyn Error>> {
        let url = serve_once("404 Not Found", "missing").await?;
        let fetcher = HttpFetcher::new(Duration::from_secs(5), LIMIT)?;
        let err = fetcher
            .fetch(&url)
            .await
            .err()
            .ok_or("expected status error")?;
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        Ok(())
    }

    #[tokio::test]
    async fn declared_length_over_limit_is_refused() -> Result<(), Box<dyn Error>> {
        let url = serve_once("200 OK", "0123456789abcdef").await?;
        let fetcher = HttpFetcher::new(Duration::from_secs(5), 8)?;
        let err = fetcher
            .fetch(&url)
            .await
            .err()
            .ok_or("expected size error")?;
        assert!(matches!(err, FetchError::TooLarge { limit: 8, .. }));
        Ok(())
    }

    #[tokio::test]
    async fn streamed_body_over_limit_is_refused() -> Result<(), Box<dyn Error>> {
        let url = serve_unsized("x".repeat(LIMIT * 4)).await?;
        let fetcher = HttpFetcher::new(Duration::from_secs(5), LIMIT)?;
        let err = fetcher
            .fetch(&url)
            .await
            .err()
            .ok_or("expected size error")?;
        assert!(matches!(err, FetchError::TooLarge { limit: LIMIT, .. }));
        Ok(())
    }

    #[tokio::test]
    async fn body_at_the_limit_is_accepted() -> Result<(), Box<dyn Error>> {
        let url = serve_unsized("y".repeat(LIMIT)).await?;
        let fetcher = HttpFetcher::new(Duration::from_secs(5), LIMIT)?;
        assert_eq!(fetcher.fetch(&url).await?.len(), LIMIT);
        Ok(())
    }
}
