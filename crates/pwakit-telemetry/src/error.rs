//! Error types for telemetry operations.
//!
//! # Design
//! - One variant per concern (subscriber, metrics registry, metrics text).
//! - Registry failures carry the operation and the metric involved.

use thiserror::Error;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised by telemetry helpers.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The global tracing subscriber could not be installed.
    #[error("tracing subscriber installation failed")]
    Subscriber {
        /// Underlying tracing subscriber error.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
    /// A Prometheus registry operation failed.
    #[error("metrics registry operation failed")]
    Registry {
        /// Operation identifier (`build_collector`, `register_collector`, `encode`).
        operation: &'static str,
        /// Metric involved, when the failure concerns a single collector.
        metric: Option<&'static str>,
        /// Underlying Prometheus error.
        #[source]
        source: prometheus::Error,
    },
    /// The encoded metrics were not valid UTF-8.
    #[error("rendered metrics were not utf-8")]
    MetricsText {
        /// Underlying UTF-8 conversion error.
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl TelemetryError {
    pub(crate) const fn registry(
        operation: &'static str,
        metric: Option<&'static str>,
        source: prometheus::Error,
    ) -> Self {
        Self::Registry {
            operation,
            metric,
            source,
        }
    }
}
