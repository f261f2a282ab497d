//! # Design
//!
//! - Centralize application-level errors for bootstrap and serving.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: pwakit_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: pwakit_telemetry::TelemetryError,
    },
    /// The remote source fetcher could not be built.
    #[error("source fetcher operation failed")]
    Fetcher {
        /// Operation identifier.
        operation: &'static str,
        /// Source fetch error.
        source: pwakit_bundle::FetchError,
    },
    /// API server operations failed.
    #[error("api server operation failed")]
    ApiServer {
        /// Operation identifier.
        operation: &'static str,
        /// Source API server error.
        source: pwakit_api::ApiServerError,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: pwakit_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: pwakit_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn fetcher(operation: &'static str, source: pwakit_bundle::FetchError) -> Self {
        Self::Fetcher { operation, source }
    }

    pub(crate) const fn api_server(
        operation: &'static str,
        source: pwakit_api::ApiServerError,
    ) -> Self {
        Self::ApiServer { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;
    use std::net::SocketAddr;

    #[test]
    fn app_error_helpers_build_variants() -> Result<(), Box<dyn Error>> {
        let config = AppError::config(
            "config.load",
            pwakit_config::ConfigError::InvalidField {
                field: "PWAKIT_HTTP_PORT",
                value: Some("0".to_string()),
                reason: "port out of range",
            },
        );
        assert!(matches!(
            config,
            AppError::Config {
                operation: "config.load",
                ..
            }
        ));
        assert_eq!(config.to_string(), "configuration operation failed");
        assert!(config.source().is_some());

        let addr: SocketAddr = "127.0.0.1:7071".parse()?;
        let api = AppError::api_server(
            "api_server.serve",
            pwakit_api::ApiServerError::Bind {
                addr,
                source: io::Error::other("in use"),
            },
        );
        assert!(matches!(api, AppError::ApiServer { .. }));
        assert_eq!(api.to_string(), "api server operation failed");
        Ok(())
    }
}
