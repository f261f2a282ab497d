use std::io::{Cursor, Read};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use pwakit_bundle::{
    Archive, AssetError, BundleError, BundleRequest, Pipeline, Producer,
    SERVICE_WORKER_PATH, SERVICE_WORKER_REGISTER_PATH, SourceFetcher, TaskOutcome,
    WebAppManifest,
};
use pwakit_config::{BundlePolicy, PlatformFamily};
use pwakit_test_support::fixtures::{SITE_URL, icon, manifest_with_icons, sample_manifest};
use pwakit_test_support::mocks::{FailingFetcher, StaticFetcher};
use url::Url;
use zip::ZipArchive;

const WORKER_URL: &str = "https://cdn.example.com/sw.js";
const REGISTER_URL: &str = "https://cdn.example.com/sw-register.js";

fn policy(platforms: Vec<PlatformFamily>) -> Result<BundlePolicy> {
    Ok(BundlePolicy {
        platforms,
        service_worker_url: Url::parse(WORKER_URL)?,
        service_worker_register_url: Url::parse(REGISTER_URL)?,
        fetch_timeout: Duration::from_secs(5),
        max_source_bytes: 1_048_576,
        image_concurrency: 4,
        template_dir: None,
    })
}

fn sample_fetcher() -> Result<Arc<StaticFetcher>> {
    Ok(Arc::new(StaticFetcher::for_sample_site(
        WORKER_URL,
        REGISTER_URL,
    )?))
}

fn zip_names(bytes: &[u8]) -> Result<Vec<String>> {
    let archive = ZipArchive::new(Cursor::new(bytes))?;
    Ok(archive.file_names().map(str::to_string).collect())
}

#[tokio::test]
async fn existing_service_worker_bundle_has_manifest_files_and_images() -> Result<()> {
    let pipeline = Pipeline::from_policy(&policy(vec![PlatformFamily::Ios])?, sample_fetcher()?);
    let artifact = pipeline
        .run(BundleRequest::new(sample_manifest(), SITE_URL, true))
        .await?;

    let mut names = zip_names(&artifact.bytes)?;
    names.sort();
    assert_eq!(
        names,
        [
            "images/ios/120x120.png",
            "images/ios/152x152.png",
            "images/ios/192x192.png",
            "manifest.json",
            "web/next-steps.md",
        ]
    );
    assert_eq!(artifact.entries, names);
    Ok(())
}

#[tokio::test]
async fn full_bundle_includes_service_worker_scripts() -> Result<()> {
    let pipeline = Pipeline::from_policy(
        &policy(vec![PlatformFamily::Ios, PlatformFamily::Android])?,
        sample_fetcher()?,
    );
    let artifact = pipeline
        .run(BundleRequest::new(sample_manifest(), SITE_URL, false))
        .await?;

    assert!(artifact.entries.iter().any(|name| name == SERVICE_WORKER_PATH));
    assert!(
        artifact
            .entries
            .iter()
            .any(|name| name == SERVICE_WORKER_REGISTER_PATH)
    );
    assert_eq!(
        artifact
            .entries
            .iter()
            .filter(|name| name.starts_with("images/android/"))
            .count(),
        3
    );

    let mut archive = ZipArchive::new(Cursor::new(artifact.bytes))?;
    let mut manifest = String::new();
    archive
        .by_name("manifest.json")?
        .read_to_string(&mut manifest)?;
    let parsed: WebAppManifest = serde_json::from_str(&manifest)?;
    assert_eq!(parsed, sample_manifest());
    Ok(())
}

#[tokio::test]
async fn service_worker_failure_reports_both_scripts() -> Result<()> {
    let fetcher = Arc::new(
        StaticFetcher::for_sample_site("https://elsewhere.example/a.js", "https://elsewhere.example/b.js")?,
    );
    let pipeline = Pipeline::from_policy(&policy(vec![PlatformFamily::Ios])?, fetcher);

    let err = pipeline
        .run(BundleRequest::new(sample_manifest(), SITE_URL, false))
        .await
        .err()
        .ok_or_else(|| anyhow!("expected delivery refusal"))?;
    assert!(matches!(err, BundleError::Delivery { .. }));
    assert_eq!(
        err.failed_paths(),
        [SERVICE_WORKER_PATH, SERVICE_WORKER_REGISTER_PATH]
    );
    Ok(())
}

#[tokio::test]
async fn one_failing_variant_is_the_only_reported_path() -> Result<()> {
    let manifest = manifest_with_icons(vec![
        icon("icons/icon-192.png", 192),
        icon("icons/missing.png", 144),
        icon("icons/icon-120.png", 120),
    ]);
    let pipeline = Pipeline::from_policy(&policy(vec![PlatformFamily::Ios])?, sample_fetcher()?);

    let run = pipeline
        .execute(BundleRequest::new(manifest, SITE_URL, true))
        .await;
    assert_eq!(run.failed_paths(), ["images/ios/144x144.png"]);
    assert!(!run.archive().contains("images/ios/144x144.png"));

    let err = run
        .into_artifact()
        .err()
        .ok_or_else(|| anyhow!("expected delivery refusal"))?;
    assert_eq!(err.failed_paths(), ["images/ios/144x144.png"]);
    Ok(())
}

#[tokio::test]
async fn successful_outcomes_map_one_to_one_onto_entries() -> Result<()> {
    let pipeline = Pipeline::from_policy(
        &policy(PlatformFamily::ALL.to_vec())?,
        sample_fetcher()?,
    );
    let run = pipeline
        .execute(BundleRequest::new(sample_manifest(), SITE_URL, false))
        .await;

    assert!(run.is_success());
    let mut paths: Vec<_> = run
        .outcomes()
        .iter()
        .map(|outcome| outcome.file_path().to_string())
        .collect();
    paths.sort();
    assert_eq!(paths, run.archive().names());
    Ok(())
}

#[tokio::test]
async fn failed_paths_equal_failed_outcomes_when_everything_fails() -> Result<()> {
    let pipeline = Pipeline::from_policy(
        &policy(vec![PlatformFamily::Ios])?,
        Arc::new(FailingFetcher::new(503)),
    );
    let run = pipeline
        .execute(BundleRequest::new(sample_manifest(), SITE_URL, false))
        .await;

    let failed: Vec<_> = run
        .outcomes()
        .iter()
        .filter(|outcome| !outcome.is_success())
        .map(|outcome| outcome.file_path().to_string())
        .collect();
    assert_eq!(failed.len(), 5);
    let err = run
        .into_artifact()
        .err()
        .ok_or_else(|| anyhow!("expected delivery refusal"))?;
    assert_eq!(err.failed_paths(), failed.as_slice());
    Ok(())
}

#[tokio::test]
async fn manifest_without_icons_fails_the_image_producer_only() -> Result<()> {
    let manifest = WebAppManifest {
        name: Some("App".to_string()),
        ..WebAppManifest::default()
    };
    let pipeline = Pipeline::from_policy(&policy(vec![PlatformFamily::Ios])?, sample_fetcher()?);
    let run = pipeline
        .execute(BundleRequest::new(manifest, SITE_URL, true))
        .await;

    assert_eq!(run.failed_paths(), ["images/ios"]);
    assert!(run.archive().contains("manifest.json"));
    Ok(())
}

#[tokio::test]
async fn repeated_runs_produce_identical_archives() -> Result<()> {
    let pipeline = Pipeline::from_policy(&policy(vec![PlatformFamily::Ios])?, sample_fetcher()?);
    let first = pipeline
        .run(BundleRequest::new(sample_manifest(), SITE_URL, false))
        .await?;
    let second = pipeline
        .run(BundleRequest::new(sample_manifest(), SITE_URL, false))
        .await?;
    assert_eq!(first.bytes, second.bytes);
    Ok(())
}

struct Slow {
    fetcher: Arc<dyn SourceFetcher>,
}

#[async_trait]
impl Producer for Slow {
    fn id(&self) -> &str {
        "slow"
    }

    async fn produce(
        &self,
        archive: &Archive,
        _request: &BundleRequest,
    ) -> Result<Vec<TaskOutcome>, AssetError> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let url = Url::parse(WORKER_URL).map_err(|_| AssetError::ProducerFatal {
            producer: "slow".to_string(),
            reason: "bad url",
        })?;
        let bytes = self.fetcher.fetch(&url).await.unwrap_or_default();
        archive.insert("slow.js", bytes);
        Ok(vec![TaskOutcome::succeeded("slow.js")])
    }
}

#[tokio::test]
async fn custom_producers_keep_registration_order() -> Result<()> {
    let fetcher: Arc<dyn SourceFetcher> = sample_fetcher()?;
    let pipeline = Pipeline::from_policy(&policy(vec![PlatformFamily::Windows])?, Arc::clone(&fetcher))
        .with_producer(Slow { fetcher });
    assert_eq!(
        pipeline.producer_ids(),
        ["images/windows", "files", "service-worker", "slow"]
    );

    let run = pipeline
        .execute(BundleRequest::new(sample_manifest(), SITE_URL, true))
        .await;
    let last = run
        .outcomes()
        .last()
        .ok_or_else(|| anyhow!("expected outcomes"))?;
    assert_eq!(last.file_path(), "slow.js");
    Ok(())
}
