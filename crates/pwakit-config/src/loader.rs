//! Environment-driven configuration loading.
//!
//! # Design
//! - Read every variable through a lookup function so tests can inject values.
//! - Treat blank values as unset; reject anything present but malformed.

use url::Url;

use crate::defaults::{
    DEFAULT_BIND_ADDR, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_HTTP_PORT, DEFAULT_IMAGE_CONCURRENCY,
    DEFAULT_LOG_LEVEL, DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_SOURCE_BYTES, DEFAULT_PLATFORMS,
    DEFAULT_SERVICE_WORKER_REGISTER_URL, DEFAULT_SERVICE_WORKER_URL,
};
use crate::error::ConfigResult;
use crate::model::{BundlePolicy, HttpConfig, LogSettings, ServiceConfig};
use crate::validate::{
    parse_bind_addr, parse_byte_limit, parse_concurrency, parse_http_url, parse_log_format,
    parse_platforms, parse_port, parse_template_dir, parse_timeout,
};

const ENV_BIND_ADDR: &str = "PWAKIT_BIND_ADDR";
const ENV_HTTP_PORT: &str = "PWAKIT_HTTP_PORT";
const ENV_MAX_BODY_BYTES: &str = "PWAKIT_MAX_BODY_BYTES";
const ENV_PLATFORMS: &str = "PWAKIT_PLATFORMS";
const ENV_SW_URL: &str = "PWAKIT_SW_URL";
const ENV_SW_REGISTER_URL: &str = "PWAKIT_SW_REGISTER_URL";
const ENV_FETCH_TIMEOUT_SECS: &str = "PWAKIT_FETCH_TIMEOUT_SECS";
const ENV_MAX_SOURCE_BYTES: &str = "PWAKIT_MAX_SOURCE_BYTES";
const ENV_IMAGE_CONCURRENCY: &str = "PWAKIT_IMAGE_CONCURRENCY";
const ENV_TEMPLATE_DIR: &str = "PWAKIT_TEMPLATE_DIR";
const ENV_LOG_LEVEL: &str = "PWAKIT_LOG_LEVEL";
const ENV_LOG_FORMAT: &str = "PWAKIT_LOG_FORMAT";

/// Load configuration from the process environment.
///
/// # Errors
///
/// Returns [`crate::ConfigError::InvalidField`] for the first variable holding
/// a malformed value.
pub fn from_env() -> ConfigResult<ServiceConfig> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Load configuration through an arbitrary variable lookup.
///
/// # Errors
///
/// Returns [`crate::ConfigError::InvalidField`] for the first variable holding
/// a malformed value.
pub fn from_lookup<F>(lookup: F) -> ConfigResult<ServiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| {
        lookup(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    let http = HttpConfig {
        bind_addr: read(ENV_BIND_ADDR)
            .map(|value| parse_bind_addr(ENV_BIND_ADDR, &value))
            .transpose()?
            .unwrap_or(DEFAULT_BIND_ADDR),
        port: read(ENV_HTTP_PORT)
            .map(|value| parse_port(ENV_HTTP_PORT, &value))
            .transpose()?
            .unwrap_or(DEFAULT_HTTP_PORT),
        max_body_bytes: read(ENV_MAX_BODY_BYTES)
            .map(|value| parse_byte_limit(ENV_MAX_BODY_BYTES, &value))
            .transpose()?
            .unwrap_or(DEFAULT_MAX_BODY_BYTES),
    };

    let platforms = parse_platforms(
        ENV_PLATFORMS,
        read(ENV_PLATFORMS).as_deref().unwrap_or(DEFAULT_PLATFORMS),
    )?;
    let bundle = BundlePolicy {
        platforms,
        service_worker_url: url_or_default(read(ENV_SW_URL), ENV_SW_URL, DEFAULT_SERVICE_WORKER_URL)?,
        service_worker_register_url: url_or_default(
            read(ENV_SW_REGISTER_URL),
            ENV_SW_REGISTER_URL,
            DEFAULT_SERVICE_WORKER_REGISTER_URL,
        )?,
        fetch_timeout: parse_timeout(
            ENV_FETCH_TIMEOUT_SECS,
            &read(ENV_FETCH_TIMEOUT_SECS).unwrap_or_else(|| DEFAULT_FETCH_TIMEOUT_SECS.to_string()),
        )?,
        max_source_bytes: read(ENV_MAX_SOURCE_BYTES)
            .map(|value| parse_byte_limit(ENV_MAX_SOURCE_BYTES, &value))
            .transpose()?
            .unwrap_or(DEFAULT_MAX_SOURCE_BYTES),
        image_concurrency: read(ENV_IMAGE_CONCURRENCY)
            .map(|value| parse_concurrency(ENV_IMAGE_CONCURRENCY, &value))
            .transpose()?
            .unwrap_or(DEFAULT_IMAGE_CONCURRENCY),
        template_dir: read(ENV_TEMPLATE_DIR)
            .map(|value| parse_template_dir(ENV_TEMPLATE_DIR, &value))
            .transpose()?,
    };

    let logging = LogSettings {
        level: read(ENV_LOG_LEVEL).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        format: read(ENV_LOG_FORMAT)
            .map(|value| parse_log_format(ENV_LOG_FORMAT, &value))
            .transpose()?,
    };

    Ok(ServiceConfig {
        http,
        bundle,
        logging,
    })
}

fn url_or_default(
    value: Option<String>,
    field: &'static str,
    default: &str,
) -> ConfigResult<Url> {
    parse_http_url(field, value.as_deref().unwrap_or(default))
}
