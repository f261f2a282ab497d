//! File copier producer: static resources and the re-encoded manifest.
//!
//! # Design
//! - The registry maps archive paths to a closed set of edit strategies.
//! - Entries run concurrently; outcomes keep registry order.
//! - Content is fully prepared before insertion, so a failure never leaves a partial entry.

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::warn;

use crate::archive::Archive;
use crate::error::AssetError;
use crate::manifest::WebAppManifest;
use crate::request::BundleRequest;
use crate::task::{Producer, TaskOutcome};
use crate::templates::Templates;

const PRODUCER_ID: &str = "files";

/// How the content of a registry entry is prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStrategy {
    /// Copy the template stored under the entry path.
    CopyTemplate,
    /// Encode the manifest as pretty-printed JSON.
    ManifestJson,
}

/// One archive path and the strategy that fills it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Archive-relative path of the entry.
    pub path: String,
    /// Strategy producing the entry content.
    pub strategy: EditStrategy,
}

impl FileEntry {
    /// Pair a path with its strategy.
    #[must_use]
    pub fn new(path: impl Into<String>, strategy: EditStrategy) -> Self {
        Self {
            path: path.into(),
            strategy,
        }
    }
}

/// Registry used when none is supplied.
#[must_use]
pub fn default_registry() -> Vec<FileEntry> {
    vec![
        FileEntry::new("web/next-steps.md", EditStrategy::CopyTemplate),
        FileEntry::new("manifest.json", EditStrategy::ManifestJson),
    ]
}

/// Producer that fills each registry entry.
#[derive(Debug, Clone)]
pub struct FileCopier {
    registry: Vec<FileEntry>,
    templates: Templates,
}

impl FileCopier {
    /// Copier over the default registry.
    #[must_use]
    pub fn new(templates: Templates) -> Self {
        Self::with_registry(default_registry(), templates)
    }

    /// Copier over a caller-supplied registry.
    #[must_use]
    pub const fn with_registry(registry: Vec<FileEntry>, templates: Templates) -> Self {
        Self {
            registry,
            templates,
        }
    }

    /// Registry entries in processing order.
    #[must_use]
    pub fn registry(&self) -> &[FileEntry] {
        &self.registry
    }

    /// Prepare and insert a single entry.
    pub async fn copy_file(
        &self,
        archive: &Archive,
        manifest: &WebAppManifest,
        entry: &FileEntry,
    ) -> TaskOutcome {
        match self.prepare(manifest, entry).await {
            Ok(bytes) => {
                archive.insert(entry.path.clone(), bytes);
                TaskOutcome::succeeded(entry.path.clone())
            }
            Err(err) => {
                warn!(path = %entry.path, error = %err, "file copy failed");
                TaskOutcome::failed(entry.path.clone(), err)
            }
        }
    }

    async fn prepare(
        &self,
        manifest: &WebAppManifest,
        entry: &FileEntry,
    ) -> Result<Vec<u8>, AssetError> {
        match entry.strategy {
            EditStrategy::CopyTemplate => self.templates.load(&entry.path).await,
            EditStrategy::ManifestJson => serde_json::to_vec_pretty(manifest)
                .map_err(|source| AssetError::json(&entry.path, source)),
        }
    }
}

#[async_trait]
impl Producer for FileCopier {
    fn id(&self) -> &str {
        PRODUCER_ID
    }

    async fn produce(
        &self,
        archive: &Archive,
        request: &BundleRequest,
    ) -> Result<Vec<TaskOutcome>, AssetError> {
        let tasks = self
            .registry
            .iter()
            .map(|entry| self.copy_file(archive, &request.manifest, entry));
        Ok(join_all(tasks).await)
    }
}
