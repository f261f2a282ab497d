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

//! HTTP surface of the pwakit bundle service.
//!
//! Layout: `http/router.rs` (router and server host), `http/package.rs`
//! (manifest-to-archive endpoint), `http/health.rs` (health and metrics),
//! `http/errors.rs` (error payloads), `http/telemetry.rs` (request metrics).

pub mod error;
pub mod http;
pub mod state;

pub use error::{ApiServerError, ApiServerResult};
pub use http::router::ApiServer;
pub use state::ApiState;
