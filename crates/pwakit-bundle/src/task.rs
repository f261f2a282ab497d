//! Outcome contract shared by every producer.
//!
//! # Design
//! - Per-asset failures are values, never early returns.
//! - A producer returns `Err` only when nothing it could write would be meaningful.

use async_trait::async_trait;

use crate::archive::Archive;
use crate::error::AssetError;
use crate::request::BundleRequest;

/// Result of one unit of asset work.
///
/// A successful outcome always has a matching archive entry; a failed one
/// carries the error and never has an entry written on its behalf.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    file_path: String,
    error: Option<AssetError>,
}

impl TaskOutcome {
    /// Outcome for an asset that was written to the archive.
    #[must_use]
    pub fn succeeded(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            error: None,
        }
    }

    /// Outcome for an asset that could not be produced.
    #[must_use]
    pub fn failed(file_path: impl Into<String>, error: AssetError) -> Self {
        Self {
            file_path: file_path.into(),
            error: Some(error),
        }
    }

    /// Archive path (or producer identity) this outcome describes.
    #[must_use]
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Whether the asset was produced.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Failure cause, present exactly when the outcome failed.
    #[must_use]
    pub const fn error(&self) -> Option<&AssetError> {
        self.error.as_ref()
    }
}

/// A family of asset work that contributes entries to the archive.
#[async_trait]
pub trait Producer: Send + Sync {
    /// Stable identity, used as the failure path when the producer itself fails.
    fn id(&self) -> &str;

    /// Write entries into `archive` and report one outcome per attempted asset.
    ///
    /// # Errors
    ///
    /// Returns an error only when the producer cannot contribute anything for
    /// this request.
    async fn produce(
        &self,
        archive: &Archive,
        request: &BundleRequest,
    ) -> Result<Vec<TaskOutcome>, AssetError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_the_absence_of_an_error() {
        let ok = TaskOutcome::succeeded("manifest.json");
        assert!(ok.is_success());
        assert!(ok.error().is_none());

        let failed = TaskOutcome::failed(
            "serviceWorker.js",
            AssetError::EmptyContent {
                path: "serviceWorker.js".to_string(),
            },
        );
        assert!(!failed.is_success());
        assert_eq!(failed.file_path(), "serviceWorker.js");
        assert!(matches!(
            failed.error(),
            Some(AssetError::EmptyContent { .. })
        ));
    }
}
