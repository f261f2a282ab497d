use std::future::Future;
use std::sync::Arc;

use pwakit_api::{ApiServer, ApiState};
use pwakit_bundle::{HttpFetcher, Pipeline, SourceFetcher};
use pwakit_config::{LogSettings, ServiceConfig};
use pwakit_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, Metrics};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Dependencies required to bootstrap the bundle service.
pub(crate) struct BootstrapDependencies {
    config: ServiceConfig,
    telemetry: Metrics,
    fetcher: Arc<dyn SourceFetcher>,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the binary entrypoint.
    pub(crate) fn from_env() -> AppResult<Self> {
        let config =
            pwakit_config::from_env().map_err(|err| AppError::config("config.from_env", err))?;
        Self::from_config(config)
    }

    pub(crate) fn from_config(config: ServiceConfig) -> AppResult<Self> {
        let telemetry =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        let bundle = &config.bundle;
        let fetcher = HttpFetcher::new(bundle.fetch_timeout, bundle.max_source_bytes)
            .map_err(|err| AppError::fetcher("fetcher.new", err))?;
        Ok(Self {
            config,
            telemetry,
            fetcher: Arc::new(fetcher),
        })
    }
}

/// Entry point for the service boot sequence.
///
/// # Errors
///
/// Returns an error if configuration, telemetry or the listener cannot be set up,
/// or if the server stops unexpectedly.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    run_app_with(dependencies, shutdown_signal()).await
}

/// Boot sequence that relies entirely on injected dependencies to simplify testing.
pub(crate) async fn run_app_with<F>(dependencies: BootstrapDependencies, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let defaults = LoggingConfig::default();
    let logging = logging_config(&dependencies.config.logging, defaults.build_sha);
    pwakit_telemetry::init_logging(&logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new("bootstrap");

    info!("pwakit bootstrap starting");
    launch(dependencies, shutdown).await
}

/// Wire the pipeline and API, then serve until `shutdown` resolves.
pub(crate) async fn launch<F>(dependencies: BootstrapDependencies, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let BootstrapDependencies {
        config,
        telemetry,
        fetcher,
    } = dependencies;

    let pipeline = Pipeline::from_policy(&config.bundle, fetcher).with_metrics(telemetry.clone());
    info!(
        producers = ?pipeline.producer_ids(),
        timeout = ?config.bundle.fetch_timeout,
        "bundle pipeline ready"
    );
    let state = ApiState::new(pipeline, telemetry, config.bundle.platforms.clone());
    let api = ApiServer::new(state, config.http.max_body_bytes);

    let addr = config.http.socket_addr();
    info!(addr = %addr, "Launching API listener");
    api.serve(addr, shutdown)
        .await
        .map_err(|err| AppError::api_server("api_server.serve", err))?;
    info!("API server shutdown complete");
    Ok(())
}

fn logging_config<'a>(settings: &'a LogSettings, build_sha: &'a str) -> LoggingConfig<'a> {
    LoggingConfig {
        level: &settings.level,
        format: pwakit_telemetry::log_format_from_setting(settings.format.as_deref())
            .unwrap_or_else(LogFormat::infer),
        build_sha,
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, TcpListener};

    use anyhow::{Result, anyhow};

    fn loopback_config(port: u16) -> Result<ServiceConfig> {
        let mut config = pwakit_config::from_lookup(|_| None)?;
        config.http.bind_addr = Ipv4Addr::LOCALHOST.into();
        config.http.port = port;
        Ok(config)
    }

    #[test]
    fn logging_config_honours_explicit_format() {
        let settings = LogSettings {
            level: "debug".to_string(),
            format: Some("json".to_string()),
        };
        let logging = logging_config(&settings, "abc123");
        assert_eq!(logging.level, "debug");
        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(logging.build_sha, "abc123");

        let default_settings = LogSettings {
            level: "info".to_string(),
            format: None,
        };
        let inferred = logging_config(&default_settings, "dev");
        assert_eq!(inferred.format, LogFormat::infer());
    }

    #[tokio::test]
    async fn launch_stops_on_shutdown() -> Result<()> {
        let dependencies = BootstrapDependencies::from_config(loopback_config(0)?)?;
        launch(dependencies, async {}).await?;
        Ok(())
    }

    #[tokio::test]
    async fn launch_reports_bind_failures() -> Result<()> {
        let occupied = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
        let port = occupied.local_addr()?.port();
        let dependencies = BootstrapDependencies::from_config(loopback_config(port)?)?;

        let err = launch(dependencies, async {})
            .await
            .err()
            .ok_or_else(|| anyhow!("expected bind failure"))?;
        assert!(matches!(
            err,
            AppError::ApiServer {
                source: pwakit_api::ApiServerError::Bind { .. },
                ..
            }
        ));
        Ok(())
    }
}
