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

//! Environment-backed configuration for the pwakit bundle service.
//!
//! Layout: `model.rs` (typed configuration and platform families), `defaults.rs`
//! (fallback values), `validate.rs` (parsing helpers), `loader.rs` (environment lookup).

mod defaults;
pub mod error;
pub mod loader;
pub mod model;
mod validate;

pub use defaults::{
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_HTTP_PORT, DEFAULT_IMAGE_CONCURRENCY,
    DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_SOURCE_BYTES, DEFAULT_SERVICE_WORKER_REGISTER_URL,
    DEFAULT_SERVICE_WORKER_URL,
};
pub use error::{ConfigError, ConfigResult};
pub use loader::{from_env, from_lookup};
pub use model::{BundlePolicy, HttpConfig, LogSettings, PlatformFamily, ServiceConfig};
