//! Typed input of one pipeline run.

use crate::manifest::WebAppManifest;

/// Manifest and options for a single bundle request.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleRequest {
    /// Manifest shared read-only with every producer.
    pub manifest: WebAppManifest,
    /// Site the manifest belongs to; relative icon sources resolve against it.
    pub site_url: String,
    /// Whether the caller already ships a service worker.
    pub has_service_worker: bool,
}

impl BundleRequest {
    /// Build a request from its parts.
    #[must_use]
    pub fn new(
        manifest: WebAppManifest,
        site_url: impl Into<String>,
        has_service_worker: bool,
    ) -> Self {
        Self {
            manifest,
            site_url: site_url.into(),
            has_service_worker,
        }
    }
}
