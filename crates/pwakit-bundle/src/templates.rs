//! Static resources copied verbatim into the archive.
//!
//! # Design
//! - Templates are embedded in the binary; an optional directory may override them by name.
//! - A name found in neither place is a per-asset failure, not a panic.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::AssetError;

const NEXT_STEPS: &[u8] = include_bytes!("../templates/next-steps.md");

/// Resolves template names to their bytes.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    dir: Option<PathBuf>,
}

impl Templates {
    /// Store backed only by the embedded templates.
    #[must_use]
    pub const fn embedded() -> Self {
        Self { dir: None }
    }

    /// Store that prefers files under `dir`, falling back to the embedded set.
    #[must_use]
    pub fn with_override_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Override directory, if any.
    #[must_use]
    pub fn override_dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Load the template stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::TemplateMissing`] when no template has that name
    /// and [`AssetError::TemplateRead`] when an override exists but cannot be read.
    pub async fn load(&self, name: &str) -> Result<Vec<u8>, AssetError> {
        if let Some(dir) = &self.dir {
            let path = dir.join(name);
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    debug!(path = %path.display(), "using template override");
                    return Ok(bytes);
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(AssetError::TemplateRead {
                        path,
                        source: Arc::new(err),
                    });
                }
            }
        }
        embedded(name)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| AssetError::TemplateMissing {
                name: name.to_string(),
            })
    }
}

fn embedded(name: &str) -> Option<&'static [u8]> {
    match name {
        "web/next-steps.md" => Some(NEXT_STEPS),
        _ => None,
    }
}
