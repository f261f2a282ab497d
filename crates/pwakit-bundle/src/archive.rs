//! Shared entry store that producers write into and the pipeline encodes once.
//!
//! # Design
//! - Insertion takes a short synchronous lock; producers never hold it across an await.
//! - Names are unique and the last write wins without error.
//! - Encoding is deterministic: sorted names, fixed timestamp, fixed permissions.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::{BundleError, BundleResult};

const ENTRY_PERMISSIONS: u32 = 0o644;

/// Mutable bag of named byte entries for one pipeline run.
#[derive(Debug, Default)]
pub struct Archive {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl Archive {
    /// Create an empty archive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the entry stored under `name`.
    pub fn insert(&self, name: impl Into<String>, bytes: Vec<u8>) {
        self.lock().insert(name.into(), bytes);
    }

    /// Whether an entry exists under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Copy of the bytes stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.lock().get(name).cloned()
    }

    /// Entry names in lexicographic order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no entry has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Encode every entry as a zip archive.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Archive`] or [`BundleError::Io`] when the zip
    /// writer rejects an entry.
    pub fn serialize(&self) -> BundleResult<Vec<u8>> {
        let entries = self.lock();
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(ENTRY_PERMISSIONS);

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in entries.iter() {
            writer
                .start_file(name.as_str(), options)
                .map_err(|source| BundleError::archive("start_entry", Some(name), source))?;
            writer
                .write_all(bytes)
                .map_err(|source| BundleError::io("write_entry", name, source))?;
        }
        let cursor = writer
            .finish()
            .map_err(|source| BundleError::archive("finish", None, source))?;
        Ok(cursor.into_inner())
    }

    // Poisoned only by a panicking producer; the map stays consistent.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
