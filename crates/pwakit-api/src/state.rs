//! Shared handler state.

use pwakit_bundle::Pipeline;
use pwakit_config::PlatformFamily;
use pwakit_telemetry::Metrics;

/// Dependencies shared by every request handler.
pub struct ApiState {
    pub(crate) pipeline: Pipeline,
    pub(crate) telemetry: Metrics,
    pub(crate) platforms: Vec<PlatformFamily>,
}

impl ApiState {
    /// Bundle the pipeline, metrics registry and advertised platforms.
    #[must_use]
    pub const fn new(pipeline: Pipeline, telemetry: Metrics, platforms: Vec<PlatformFamily>) -> Self {
        Self {
            pipeline,
            telemetry,
            platforms,
        }
    }
}
