//! Pipeline orchestrator.
//!
//! # Design
//! - Each producer runs as its own tokio task over one shared archive.
//! - Tasks live in a `JoinSet`, so dropping a run aborts every producer still in flight.
//! - Producer errors and panics become a single failed outcome tagged with the producer id.
//! - Delivery is all-or-nothing: any failed outcome refuses the archive.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use pwakit_config::BundlePolicy;
use pwakit_telemetry::{Metrics, current_request_id};
use tokio::task::JoinSet;
use tracing::{Instrument, error, info, info_span, warn};

use crate::archive::Archive;
use crate::copier::FileCopier;
use crate::error::{AssetError, BundleError, BundleResult};
use crate::fetch::SourceFetcher;
use crate::images::ImageProducer;
use crate::request::BundleRequest;
use crate::service_worker::ServiceWorkerProvisioner;
use crate::task::{Producer, TaskOutcome};
use crate::templates::Templates;

const STATUS_SUCCEEDED: &str = "succeeded";
const STATUS_FAILED: &str = "failed";
const RESULT_DELIVERED: &str = "delivered";
const RESULT_REFUSED: &str = "refused";

/// Serialized archive ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleArtifact {
    /// Zip-encoded archive bytes.
    pub bytes: Vec<u8>,
    /// Entry names in archive order.
    pub entries: Vec<String>,
}

/// Everything one run produced before the delivery decision.
#[derive(Debug)]
pub struct PipelineRun {
    archive: Arc<Archive>,
    outcomes: Vec<TaskOutcome>,
}

impl PipelineRun {
    /// Merged outcomes in producer registration order.
    #[must_use]
    pub fn outcomes(&self) -> &[TaskOutcome] {
        &self.outcomes
    }

    /// Archive the producers wrote into.
    #[must_use]
    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// Paths of every failed outcome, in outcome order.
    #[must_use]
    pub fn failed_paths(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.is_success())
            .map(|outcome| outcome.file_path().to_string())
            .collect()
    }

    /// Whether every outcome succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(TaskOutcome::is_success)
    }

    /// Apply the delivery policy and encode the archive.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Delivery`] when any outcome failed, or an archive
    /// error when encoding fails.
    pub fn into_artifact(self) -> BundleResult<BundleArtifact> {
        let failed_paths = self.failed_paths();
        if !failed_paths.is_empty() {
            return Err(BundleError::Delivery { failed_paths });
        }
        let bytes = self.archive.serialize()?;
        Ok(BundleArtifact {
            bytes,
            entries: self.archive.names(),
        })
    }
}

/// Runs registered producers and applies the delivery policy.
#[derive(Clone, Default)]
pub struct Pipeline {
    producers: Vec<Arc<dyn Producer>>,
    metrics: Option<Metrics>,
}

impl Pipeline {
    /// Pipeline with no producers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard producer set: one image producer per configured family, the
    /// file copier, then the service worker provisioner.
    #[must_use]
    pub fn from_policy(policy: &BundlePolicy, fetcher: Arc<dyn SourceFetcher>) -> Self {
        let templates = policy
            .template_dir
            .as_ref()
            .map_or_else(Templates::embedded, |dir| Templates::with_override_dir(dir.clone()));

        let mut pipeline = Self::new();
        for family in &policy.platforms {
            pipeline = pipeline.with_producer(
                ImageProducer::new(*family, Arc::clone(&fetcher))
                    .with_concurrency(policy.image_concurrency),
            );
        }
        pipeline
            .with_producer(FileCopier::new(templates))
            .with_producer(ServiceWorkerProvisioner::new(
                fetcher,
                policy.service_worker_url.clone(),
                policy.service_worker_register_url.clone(),
                policy.fetch_timeout,
            ))
    }

    /// Register another producer; registration order fixes outcome order.
    #[must_use]
    pub fn with_producer(mut self, producer: impl Producer + 'static) -> Self {
        self.producers.push(Arc::new(producer));
        self
    }

    /// Record run and task metrics into `metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Identities of the registered producers, in order.
    #[must_use]
    pub fn producer_ids(&self) -> Vec<&str> {
        self.producers.iter().map(|producer| producer.id()).collect()
    }

    /// Run every producer and collect their outcomes without deciding delivery.
    pub async fn execute(&self, request: BundleRequest) -> PipelineRun {
        let request = Arc::new(request);
        let archive = Arc::new(Archive::new());
        let span = info_span!(
            "bundle_run",
            request_id = current_request_id().as_deref().unwrap_or("-"),
            site_url = %request.site_url,
        );

        let ids: Vec<String> = self
            .producers
            .iter()
            .map(|producer| producer.id().to_string())
            .collect();
        let mut tasks = JoinSet::new();
        let mut slots = HashMap::with_capacity(self.producers.len());
        for (index, producer) in self.producers.iter().enumerate() {
            let producer = Arc::clone(producer);
            let archive = Arc::clone(&archive);
            let request = Arc::clone(&request);
            let handle = tasks.spawn(
                async move { producer.produce(&archive, &request).await }.instrument(span.clone()),
            );
            slots.insert(handle.id(), index);
        }

        let mut produced: Vec<Option<Vec<TaskOutcome>>> =
            std::iter::repeat_with(|| None).take(ids.len()).collect();
        while let Some(joined) = tasks.join_next_with_id().await {
            let (task_id, result) = match joined {
                Ok((task_id, result)) => (task_id, Ok(result)),
                Err(join_error) => (join_error.id(), Err(join_error)),
            };
            let Some(&index) = slots.get(&task_id) else {
                continue;
            };
            let id = &ids[index];
            let outcomes = match result {
                Ok(Ok(outcomes)) => outcomes,
                Ok(Err(err)) => {
                    warn!(parent: &span, producer = %id, error = %err, "producer failed");
                    vec![TaskOutcome::failed(id.clone(), err)]
                }
                Err(join_error) => {
                    error!(parent: &span, producer = %id, panicked = join_error.is_panic(), "producer task aborted");
                    vec![TaskOutcome::failed(
                        id.clone(),
                        AssetError::ProducerPanicked {
                            producer: id.clone(),
                        },
                    )]
                }
            };
            produced[index] = Some(outcomes);
        }

        let mut outcomes = Vec::new();
        for (id, slot) in ids.iter().zip(produced) {
            let slot = slot.unwrap_or_default();
            self.record_tasks(id, &slot);
            outcomes.extend(slot);
        }

        PipelineRun { archive, outcomes }
    }

    /// Run every producer and deliver the archive when all outcomes succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Delivery`] listing every failed path, or an
    /// archive error when encoding fails.
    pub async fn run(&self, request: BundleRequest) -> BundleResult<BundleArtifact> {
        let started = Instant::now();
        let run = self.execute(request).await;
        let total = run.outcomes().len();
        let result = run.into_artifact();
        let elapsed = started.elapsed();

        match &result {
            Ok(artifact) => {
                info!(
                    tasks = total,
                    entries = artifact.entries.len(),
                    bytes = artifact.bytes.len(),
                    elapsed = ?elapsed,
                    "bundle delivered"
                );
            }
            Err(err) => {
                warn!(
                    tasks = total,
                    failed = ?err.failed_paths(),
                    error = %err,
                    elapsed = ?elapsed,
                    "bundle refused"
                );
            }
        }

        if let Some(metrics) = &self.metrics {
            metrics.observe_run_latency(elapsed);
            match &result {
                Ok(artifact) => {
                    metrics.inc_bundle_run(RESULT_DELIVERED);
                    metrics.set_archive_bytes(artifact.bytes.len());
                }
                Err(_) => metrics.inc_bundle_run(RESULT_REFUSED),
            }
        }
        result
    }

    fn record_tasks(&self, producer: &str, outcomes: &[TaskOutcome]) {
        let Some(metrics) = &self.metrics else {
            return;
        };
        for outcome in outcomes {
            let status = if outcome.is_success() {
                STATUS_SUCCEEDED
            } else {
                STATUS_FAILED
            };
            metrics.inc_bundle_task(producer, status);
        }
    }
}
