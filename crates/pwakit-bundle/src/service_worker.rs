//! Service worker provisioner: the worker script and its registration script.
//!
//! # Design
//! - Both scripts succeed or fail together; a failure is reported on both paths.
//! - Acquisition is bounded by a single timeout covering both fetches.
//! - Nothing is written until both scripts are in hand.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

use crate::archive::Archive;
use crate::error::AssetError;
use crate::fetch::SourceFetcher;
use crate::request::BundleRequest;
use crate::task::{Producer, TaskOutcome};

/// Archive path of the worker script.
pub const SERVICE_WORKER_PATH: &str = "serviceWorker.js";
/// Archive path of the registration script.
pub const SERVICE_WORKER_REGISTER_PATH: &str = "serviceWorker-register.js";

const PRODUCER_ID: &str = "service-worker";

/// Producer that supplies a service worker unless the caller already has one.
pub struct ServiceWorkerProvisioner {
    fetcher: Arc<dyn SourceFetcher>,
    worker_url: Url,
    register_url: Url,
    timeout: Duration,
}

impl ServiceWorkerProvisioner {
    /// Provisioner fetching both scripts through `fetcher` within `timeout`.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn SourceFetcher>,
        worker_url: Url,
        register_url: Url,
        timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            worker_url,
            register_url,
            timeout,
        }
    }

    async fn acquire(&self) -> Result<(Vec<u8>, Vec<u8>), AssetError> {
        let (worker, register) = tokio::join!(
            self.fetch_script(&self.worker_url, SERVICE_WORKER_PATH),
            self.fetch_script(&self.register_url, SERVICE_WORKER_REGISTER_PATH),
        );
        Ok((worker?, register?))
    }

    async fn fetch_script(&self, url: &Url, path: &str) -> Result<Vec<u8>, AssetError> {
        let bytes = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|source| AssetError::fetch(url, source))?;
        if bytes.is_empty() {
            return Err(AssetError::EmptyContent {
                path: path.to_string(),
            });
        }
        Ok(bytes)
    }
}

#[async_trait]
impl Producer for ServiceWorkerProvisioner {
    fn id(&self) -> &str {
        PRODUCER_ID
    }

    async fn produce(
        &self,
        archive: &Archive,
        request: &BundleRequest,
    ) -> Result<Vec<TaskOutcome>, AssetError> {
        if request.has_service_worker {
            debug!("caller ships a service worker; skipping");
            return Ok(Vec::new());
        }

        let acquired = match timeout(self.timeout, self.acquire()).await {
            Ok(result) => result,
            Err(_) => Err(AssetError::Timeout {
                operation: "acquire_service_worker",
                after: self.timeout,
            }),
        };

        match acquired {
            Ok((worker, register)) => {
                archive.insert(SERVICE_WORKER_PATH, worker);
                archive.insert(SERVICE_WORKER_REGISTER_PATH, register);
                Ok(vec![
                    TaskOutcome::succeeded(SERVICE_WORKER_PATH),
                    TaskOutcome::succeeded(SERVICE_WORKER_REGISTER_PATH),
                ])
            }
            Err(err) => {
                warn!(error = %err, "service worker acquisition failed");
                Ok(vec![
                    TaskOutcome::failed(SERVICE_WORKER_PATH, err.clone()),
                    TaskOutcome::failed(SERVICE_WORKER_REGISTER_PATH, err),
                ])
            }
        }
    }
}
