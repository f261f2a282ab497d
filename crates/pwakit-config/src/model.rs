//! Typed configuration records.
//!
//! # Design
//! - `ServiceConfig` is immutable once loaded; consumers clone the sections they need.
//! - Platform families carry their own image conventions so producers stay table-driven.

use std::fmt::{self, Display, Formatter};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// Fully validated service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// HTTP listener settings.
    pub http: HttpConfig,
    /// Settings consumed by the bundle pipeline.
    pub bundle: BundlePolicy,
    /// Logging preferences.
    pub logging: LogSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// IP address the server binds to.
    pub bind_addr: IpAddr,
    /// Port the server binds to.
    pub port: u16,
    /// Maximum accepted request body, in bytes.
    pub max_body_bytes: usize,
}

impl HttpConfig {
    /// Socket address combining the bind address and port.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

/// Settings consumed by the bundle pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlePolicy {
    /// Platform families that receive an image producer, in registration order.
    pub platforms: Vec<PlatformFamily>,
    /// Source of the `serviceWorker.js` entry.
    pub service_worker_url: Url,
    /// Source of the `serviceWorker-register.js` entry.
    pub service_worker_register_url: Url,
    /// Upper bound applied to remote fetches.
    pub fetch_timeout: Duration,
    /// Largest body accepted from a single remote source, in bytes.
    pub max_source_bytes: usize,
    /// Image variants rendered at once by each platform producer.
    pub image_concurrency: usize,
    /// Directory overriding the embedded static templates.
    pub template_dir: Option<PathBuf>,
}

/// Logging preferences read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Explicit output format (`json` or `pretty`); inferred when absent.
    pub format: Option<String>,
}

/// Target platform family for derived image assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFamily {
    /// Apple touch icons.
    Ios,
    /// Android launcher icons.
    Android,
    /// Windows tiles.
    Windows,
}

impl PlatformFamily {
    /// Every known family, in canonical order.
    pub const ALL: [Self; 3] = [Self::Ios, Self::Android, Self::Windows];

    /// Lowercase identifier used in configuration and archive paths.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::Android => "android",
            Self::Windows => "windows",
        }
    }

    /// Archive directory holding this family's images.
    #[must_use]
    pub const fn directory(self) -> &'static str {
        match self {
            Self::Ios => "images/ios",
            Self::Android => "images/android",
            Self::Windows => "images/windows",
        }
    }

    /// Edge length used for icons that declare `any` or no size.
    #[must_use]
    pub const fn default_edge(self) -> u32 {
        match self {
            Self::Ios => 180,
            Self::Android => 512,
            Self::Windows => 150,
        }
    }

    /// Whether transparent pixels are composited onto an opaque background.
    #[must_use]
    pub const fn flattens_alpha(self) -> bool {
        matches!(self, Self::Ios)
    }
}

impl Display for PlatformFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformFamily {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ios" => Ok(Self::Ios),
            "android" => Ok(Self::Android),
            "windows" => Ok(Self::Windows),
            _ => Err(ConfigError::invalid(
                "platform",
                s,
                "unknown platform family",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn platform_family_round_trips_through_str() -> Result<(), ConfigError> {
        for family in PlatformFamily::ALL {
            assert_eq!(family.as_str().parse::<PlatformFamily>()?, family);
        }
        assert_eq!(" Android ".parse::<PlatformFamily>()?, PlatformFamily::Android);
        Ok(())
    }

    #[test]
    fn platform_family_rejects_unknown_values() {
        let err = "tizen".parse::<PlatformFamily>().err();
        assert!(matches!(
            err,
            Some(ConfigError::InvalidField { field: "platform", .. })
        ));
    }

    #[test]
    fn only_ios_flattens_alpha() {
        assert!(PlatformFamily::Ios.flattens_alpha());
        assert!(!PlatformFamily::Android.flattens_alpha());
        assert!(!PlatformFamily::Windows.flattens_alpha());
        assert_eq!(PlatformFamily::Windows.directory(), "images/windows");
        assert_eq!(PlatformFamily::Android.default_edge(), 512);
    }

    #[test]
    fn platform_family_serializes_lowercase() -> Result<(), serde_json::Error> {
        let value = serde_json::to_string(&PlatformFamily::Ios)?;
        assert_eq!(value, "\"ios\"");
        Ok(())
    }

    #[test]
    fn socket_addr_combines_ip_and_port() {
        let http = HttpConfig {
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 9000,
            max_body_bytes: 10,
        };
        assert_eq!(http.socket_addr().to_string(), "127.0.0.1:9000");
    }
}
