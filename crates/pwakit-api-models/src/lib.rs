#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the pwakit bundle API.
//!
//! The query and error payload field names are part of the public contract
//! (`siteUrl`, `hasServiceWorker`, `errMessage`) and are pinned with serde renames.

use serde::{Deserialize, Serialize};

use pwakit_bundle::{BundleRequest, WebAppManifest};
use pwakit_config::PlatformFamily;

/// Query parameters accepted by `POST /`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageQuery {
    /// Site the manifest belongs to.
    #[serde(default)]
    pub site_url: String,
    /// Whether the site already ships a service worker.
    #[serde(default)]
    pub has_service_worker: bool,
}

impl PackageQuery {
    /// Combine the query with the manifest body into a pipeline request.
    #[must_use]
    pub fn into_request(self, manifest: WebAppManifest) -> BundleRequest {
        BundleRequest::new(manifest, self.site_url, self.has_service_worker)
    }
}

/// Error payload returned for every non-success response of `POST /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageErrorResponse {
    /// Human-readable summary.
    pub message: String,
    /// Failure detail; the comma-joined failing paths for refused deliveries.
    #[serde(rename = "errMessage")]
    pub err_message: String,
}

impl PackageErrorResponse {
    /// Build a payload from its parts.
    #[must_use]
    pub fn new(message: impl Into<String>, err_message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            err_message: err_message.into(),
        }
    }
}

/// Response body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests.
    pub status: String,
    /// Build identifier recorded at startup.
    pub build: String,
    /// Platform families that receive image producers.
    pub platforms: Vec<PlatformFamily>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn package_query_uses_camel_case_and_defaults() -> Result<(), serde_json::Error> {
        let query: PackageQuery = serde_json::from_value(json!({
            "siteUrl": "https://example.com",
            "hasServiceWorker": true
        }))?;
        assert_eq!(query.site_url, "https://example.com");
        assert!(query.has_service_worker);

        let query: PackageQuery = serde_json::from_value(json!({ "siteUrl": "https://a.b" }))?;
        assert!(!query.has_service_worker);
        Ok(())
    }

    #[test]
    fn query_converts_into_request() {
        let query = PackageQuery {
            site_url: "https://example.com/".to_string(),
            has_service_worker: true,
        };
        let request = query.into_request(WebAppManifest::default());
        assert_eq!(request.site_url, "https://example.com/");
        assert!(request.has_service_worker);
    }

    #[test]
    fn error_payload_serializes_err_message() -> Result<(), serde_json::Error> {
        let body = PackageErrorResponse::new("failed", "a.png,b.png");
        assert_eq!(
            serde_json::to_value(&body)?,
            json!({ "message": "failed", "errMessage": "a.png,b.png" })
        );
        Ok(())
    }

    #[test]
    fn health_lists_platforms_in_lowercase() -> Result<(), serde_json::Error> {
        let body = HealthResponse {
            status: "ok".to_string(),
            build: "dev".to_string(),
            platforms: vec![PlatformFamily::Ios, PlatformFamily::Windows],
        };
        assert_eq!(
            serde_json::to_value(&body)?["platforms"],
            json!(["ios", "windows"])
        );
        Ok(())
    }
}
