//! Parsing helpers for individual configuration values.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::defaults::{MAX_FETCH_TIMEOUT_SECS, MAX_IMAGE_CONCURRENCY};
use crate::error::{ConfigError, ConfigResult};
use crate::model::PlatformFamily;

pub(crate) fn parse_bind_addr(field: &'static str, value: &str) -> ConfigResult<IpAddr> {
    value
        .parse::<IpAddr>()
        .map_err(|_| ConfigError::invalid(field, value, "must be an IP address"))
}

pub(crate) fn parse_port(field: &'static str, value: &str) -> ConfigResult<u16> {
    let port = value
        .parse::<u32>()
        .map_err(|_| ConfigError::invalid(field, value, "must be an integer"))?;
    if !(1..=65_535).contains(&port) {
        return Err(ConfigError::invalid(
            field,
            value,
            "must be between 1 and 65535",
        ));
    }
    u16::try_from(port).map_err(|_| ConfigError::invalid(field, value, "must fit in 16 bits"))
}

pub(crate) fn parse_byte_limit(field: &'static str, value: &str) -> ConfigResult<usize> {
    let limit = value
        .parse::<usize>()
        .map_err(|_| ConfigError::invalid(field, value, "must be an integer"))?;
    if limit == 0 {
        return Err(ConfigError::invalid(field, value, "must be positive"));
    }
    Ok(limit)
}

pub(crate) fn parse_concurrency(field: &'static str, value: &str) -> ConfigResult<usize> {
    let limit = value
        .parse::<usize>()
        .map_err(|_| ConfigError::invalid(field, value, "must be an integer"))?;
    if !(1..=MAX_IMAGE_CONCURRENCY).contains(&limit) {
        return Err(ConfigError::invalid(field, value, "must be between 1 and 64"));
    }
    Ok(limit)
}

pub(crate) fn parse_timeout(field: &'static str, value: &str) -> ConfigResult<Duration> {
    let secs = value
        .parse::<u64>()
        .map_err(|_| ConfigError::invalid(field, value, "must be an integer"))?;
    if !(1..=MAX_FETCH_TIMEOUT_SECS).contains(&secs) {
        return Err(ConfigError::invalid(
            field,
            value,
            "must be between 1 and 300 seconds",
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Parse a comma-separated list of platform families, dropping repeats.
pub(crate) fn parse_platforms(
    field: &'static str,
    value: &str,
) -> ConfigResult<Vec<PlatformFamily>> {
    let mut platforms = Vec::new();
    for part in value.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        let family = part
            .parse::<PlatformFamily>()
            .map_err(|_| ConfigError::invalid(field, part, "unknown platform family"))?;
        if !platforms.contains(&family) {
            platforms.push(family);
        }
    }
    if platforms.is_empty() {
        return Err(ConfigError::invalid(
            field,
            value,
            "must name at least one platform",
        ));
    }
    Ok(platforms)
}

pub(crate) fn parse_http_url(field: &'static str, value: &str) -> ConfigResult<Url> {
    let url = Url::parse(value).map_err(|_| ConfigError::invalid(field, value, "must be a URL"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::invalid(
            field,
            value,
            "must use the http or https scheme",
        )),
    }
}

pub(crate) fn parse_log_format(field: &'static str, value: &str) -> ConfigResult<String> {
    let format = value.to_ascii_lowercase();
    match format.as_str() {
        "json" | "pretty" => Ok(format),
        _ => Err(ConfigError::invalid(field, value, "must be json or pretty")),
    }
}

pub(crate) fn parse_template_dir(field: &'static str, value: &str) -> ConfigResult<PathBuf> {
    let path = PathBuf::from(value);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(ConfigError::invalid(field, value, "must be an existing directory"))
    }
}
