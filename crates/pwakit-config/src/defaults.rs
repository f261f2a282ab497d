//! Fallback values applied when a variable is not set.
//!
//! # Design
//! - Keep every default in one place so the loader and documentation agree.

use std::net::{IpAddr, Ipv4Addr};

/// Default HTTP port for the bundle service.
pub const DEFAULT_HTTP_PORT: u16 = 7071;
/// Default maximum accepted request body, in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1_048_576;
/// Default per-fetch timeout, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
/// Default number of image variants rendered at once per platform family.
pub const DEFAULT_IMAGE_CONCURRENCY: usize = 8;
/// Default cap on a single fetched source body, in bytes.
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 8 * 1_048_576;
/// Default source of the generated service worker script.
pub const DEFAULT_SERVICE_WORKER_URL: &str = "https://raw.githubusercontent.com/pwa-builder/pwabuilder-serviceworkers/master/serviceWorker1/pwabuilder-sw.js";
/// Default source of the service worker registration script.
pub const DEFAULT_SERVICE_WORKER_REGISTER_URL: &str = "https://raw.githubusercontent.com/pwa-builder/pwabuilder-serviceworkers/master/serviceWorker1/pwabuilder-sw-register.js";

pub(crate) const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
pub(crate) const DEFAULT_PLATFORMS: &str = "ios";
pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";
pub(crate) const MAX_FETCH_TIMEOUT_SECS: u64 = 300;
pub(crate) const MAX_IMAGE_CONCURRENCY: usize = 64;
