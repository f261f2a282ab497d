//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes a minimal set of counters/gauges relevant to bundle generation.

use std::convert::TryFrom;
use std::sync::Arc;
use std::time::Duration;

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    bundle_runs_total: IntCounterVec,
    bundle_tasks_total: IntCounterVec,
    bundle_archive_bytes: IntGauge,
    bundle_run_latency_ms: IntGauge,
}

/// Snapshot of selected gauges and counters for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Bundle runs that delivered an archive.
    pub runs_succeeded: u64,
    /// Bundle runs that were refused because at least one task failed.
    pub runs_failed: u64,
    /// Size in bytes of the most recently delivered archive.
    pub last_archive_bytes: i64,
    /// Latency (ms) of the most recent bundle run.
    pub last_run_latency_ms: i64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests received"),
            &["route", "code"],
        )
        .map_err(|source| collector_error("http_requests_total", source))?;
        let bundle_runs_total = IntCounterVec::new(
            Opts::new("bundle_runs_total", "Bundle pipeline runs by result"),
            &["result"],
        )
        .map_err(|source| collector_error("bundle_runs_total", source))?;
        let bundle_tasks_total = IntCounterVec::new(
            Opts::new(
                "bundle_tasks_total",
                "Bundle asset tasks completed by producer and status",
            ),
            &["producer", "status"],
        )
        .map_err(|source| collector_error("bundle_tasks_total", source))?;
        let bundle_archive_bytes = IntGauge::with_opts(Opts::new(
            "bundle_archive_bytes",
            "Size of the most recently delivered archive",
        ))
        .map_err(|source| collector_error("bundle_archive_bytes", source))?;
        let bundle_run_latency_ms = IntGauge::with_opts(Opts::new(
            "bundle_run_latency_ms",
            "Time taken by the most recent bundle run (ms)",
        ))
        .map_err(|source| collector_error("bundle_run_latency_ms", source))?;

        register(&registry, "http_requests_total", &http_requests_total)?;
        register(&registry, "bundle_runs_total", &bundle_runs_total)?;
        register(&registry, "bundle_tasks_total", &bundle_tasks_total)?;
        register(&registry, "bundle_archive_bytes", &bundle_archive_bytes)?;
        register(&registry, "bundle_run_latency_ms", &bundle_run_latency_ms)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                bundle_runs_total,
                bundle_tasks_total,
                bundle_archive_bytes,
                bundle_run_latency_ms,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        let code = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[route, code.as_str()])
            .inc();
    }

    /// Increment the bundle run counter for the given result (`delivered` or `refused`).
    pub fn inc_bundle_run(&self, result: &str) {
        self.inner
            .bundle_runs_total
            .with_label_values(&[result])
            .inc();
    }

    /// Increment the task counter for a producer and status (`succeeded` or `failed`).
    pub fn inc_bundle_task(&self, producer: &str, status: &str) {
        self.inner
            .bundle_tasks_total
            .with_label_values(&[producer, status])
            .inc();
    }

    /// Record the size of a delivered archive.
    pub fn set_archive_bytes(&self, bytes: usize) {
        self.inner
            .bundle_archive_bytes
            .set(i64::try_from(bytes).unwrap_or(i64::MAX));
    }

    /// Record the latency of a bundle run.
    pub fn observe_run_latency(&self, duration: Duration) {
        self.inner
            .bundle_run_latency_ms
            .set(Self::duration_to_ms(duration));
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::registry("encode", None, source))?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsText { source })
    }

    /// Take a point-in-time snapshot of the most relevant gauges and counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runs_succeeded: self
                .inner
                .bundle_runs_total
                .with_label_values(&["delivered"])
                .get(),
            runs_failed: self
                .inner
                .bundle_runs_total
                .with_label_values(&["refused"])
                .get(),
            last_archive_bytes: self.inner.bundle_archive_bytes.get(),
            last_run_latency_ms: self.inner.bundle_run_latency_ms.get(),
        }
    }

    /// Convert a duration to milliseconds saturating at `i64::MAX`.
    pub(crate) fn duration_to_ms(duration: Duration) -> i64 {
        i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
    }
}

fn collector_error(name: &'static str, source: prometheus::Error) -> TelemetryError {
    TelemetryError::registry("build_collector", Some(name), source)
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::registry("register_collector", Some(name), source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn duration_to_ms_saturates_on_large_values() {
        let duration = Duration::from_secs(u64::MAX / 2);
        assert_eq!(Metrics::duration_to_ms(duration), i64::MAX);
    }

    #[test]
    fn metrics_snapshot_reflects_updates() -> Result<()> {
        let metrics = Metrics::new()?;
        metrics.inc_http_request("/", 200);
        metrics.inc_bundle_run("delivered");
        metrics.inc_bundle_run("delivered");
        metrics.inc_bundle_run("refused");
        metrics.inc_bundle_task("files", "succeeded");
        metrics.set_archive_bytes(4_096);
        metrics.observe_run_latency(Duration::from_millis(85));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.runs_succeeded, 2);
        assert_eq!(snapshot.runs_failed, 1);
        assert_eq!(snapshot.last_archive_bytes, 4_096);
        assert_eq!(snapshot.last_run_latency_ms, 85);

        let rendered = metrics.render()?;
        assert!(rendered.contains("http_requests_total"));
        assert!(rendered.contains("bundle_tasks_total"));
        assert!(rendered.contains("bundle_run_latency_ms"));
        Ok(())
    }

    #[test]
    fn registries_are_independent_per_instance() -> Result<()> {
        let first = Metrics::new()?;
        let second = Metrics::new()?;
        first.inc_bundle_run("refused");
        assert_eq!(first.snapshot().runs_failed, 1);
        assert_eq!(second.snapshot().runs_failed, 0);
        Ok(())
    }

    #[test]
    fn duplicate_registration_names_the_collector() -> Result<()> {
        let registry = Registry::new();
        let gauge = IntGauge::new("bundle_archive_bytes", "archive size")
            .map_err(|source| collector_error("bundle_archive_bytes", source))?;
        register(&registry, "bundle_archive_bytes", &gauge)?;

        let err = register(&registry, "bundle_archive_bytes", &gauge).err();
        assert!(matches!(
            err,
            Some(TelemetryError::Registry {
                operation: "register_collector",
                metric: Some("bundle_archive_bytes"),
                ..
            })
        ));
        Ok(())
    }
}
