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
#![allow(clippy::module_name_repetitions)]

//! Manifest-to-archive bundle pipeline.
//!
//! Producers write entries into a shared [`Archive`] and report one
//! [`TaskOutcome`] per asset. The [`Pipeline`] runs every producer
//! concurrently and only serializes the archive when all outcomes succeeded.
//!
//! Layout: `archive.rs` (entry store and zip encoding), `task.rs` (outcome
//! contract and `Producer` trait), `copier.rs`, `images.rs` and
//! `service_worker.rs` (producers), `pipeline.rs` (orchestration).

pub mod archive;
pub mod copier;
pub mod error;
pub mod fetch;
pub mod images;
pub mod manifest;
pub mod pipeline;
pub mod request;
pub mod service_worker;
pub mod task;
pub mod templates;

pub use archive::Archive;
pub use copier::{EditStrategy, FileCopier, FileEntry, default_registry};
pub use error::{AssetError, BundleError, BundleResult, FetchError};
pub use fetch::{HttpFetcher, SourceFetcher};
pub use images::ImageProducer;
pub use manifest::{ManifestIcon, WebAppManifest};
pub use pipeline::{BundleArtifact, Pipeline, PipelineRun};
pub use request::BundleRequest;
pub use service_worker::{
    SERVICE_WORKER_PATH, SERVICE_WORKER_REGISTER_PATH, ServiceWorkerProvisioner,
};
pub use task::{Producer, TaskOutcome};
pub use templates::Templates;
