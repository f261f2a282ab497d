//! `POST /`: turn a web app manifest into a zip bundle.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::Response,
};
use pwakit_api_models::PackageQuery;
use pwakit_bundle::{BundleError, WebAppManifest};
use tracing::{error, info, warn};

use crate::http::constants::{ARCHIVE_DISPOSITION, CONTENT_TYPE_ZIP};
use crate::http::errors::ApiError;
use crate::state::ApiState;

pub(crate) async fn package(
    State(state): State<Arc<ApiState>>,
    query: Result<Query<PackageQuery>, QueryRejection>,
    manifest: Result<Json<WebAppManifest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        warn!(error = %rejection, "rejected package query");
        ApiError::bad_request(rejection.body_text())
    })?;
    let Json(manifest) = manifest.map_err(|rejection| {
        warn!(error = %rejection, "rejected manifest body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::rejected(StatusCode::PAYLOAD_TOO_LARGE, rejection.body_text())
        } else {
            ApiError::bad_request(rejection.body_text())
        }
    })?;

    info!(
        site_url = %query.site_url,
        has_service_worker = query.has_service_worker,
        "package requested"
    );
    match state.pipeline.run(query.into_request(manifest)).await {
        Ok(artifact) => Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, CONTENT_TYPE_ZIP)
            .header(CONTENT_DISPOSITION, ARCHIVE_DISPOSITION)
            .body(Body::from(artifact.bytes))
            .map_err(|err| {
                error!(error = %err, "failed to build archive response");
                ApiError::internal("failed to build archive response")
            }),
        Err(BundleError::Delivery { failed_paths }) => {
            Err(ApiError::delivery_refused(&failed_paths))
        }
        Err(err) => {
            error!(error = %err, "failed to assemble archive");
            Err(ApiError::internal(err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    use async_trait::async_trait;
    use axum::body::to_bytes;
    use axum::response::IntoResponse;
    use pwakit_api_models::PackageErrorResponse;
    use pwakit_bundle::{Archive, AssetError, BundleRequest, Pipeline, Producer, TaskOutcome};
    use pwakit_telemetry::Metrics;

    struct Writes(&'static str);

    #[async_trait]
    impl Producer for Writes {
        fn id(&self) -> &str {
            "writes"
        }

        async fn produce(
            &self,
            archive: &Archive,
            _request: &BundleRequest,
        ) -> Result<Vec<TaskOutcome>, AssetError> {
            archive.insert(self.0, b"content".to_vec());
            Ok(vec![TaskOutcome::succeeded(self.0)])
        }
    }

    struct Refuses;

    #[async_trait]
    impl Producer for Refuses {
        fn id(&self) -> &str {
            "refuses"
        }

        async fn produce(
            &self,
            _archive: &Archive,
            _request: &BundleRequest,
        ) -> Result<Vec<TaskOutcome>, AssetError> {
            Ok(vec![
                TaskOutcome::failed(
                    "a.png",
                    AssetError::EmptyContent {
                        path: "a.png".to_string(),
                    },
                ),
                TaskOutcome::failed(
                    "b.png",
                    AssetError::EmptyContent {
                        path: "b.png".to_string(),
                    },
                ),
            ])
        }
    }

    fn state(pipeline: Pipeline) -> Result<Arc<ApiState>, Box<dyn Error>> {
        Ok(Arc::new(ApiState::new(pipeline, Metrics::new()?, Vec::new())))
    }

    fn query() -> Result<Query<PackageQuery>, QueryRejection> {
        Ok(Query(PackageQuery {
            site_url: "https://example.com/".to_string(),
            has_service_worker: true,
        }))
    }

    #[tokio::test]
    async fn successful_run_returns_zip_attachment() -> Result<(), Box<dyn Error>> {
        let state = state(Pipeline::new().with_producer(Writes("web/next-steps.md")))?;
        let response = package(
            State(state),
            query(),
            Ok(Json(WebAppManifest::default())),
        )
        .await
        .map_err(|err| format!("unexpected error: {err:?}"))?;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(CONTENT_TYPE_ZIP.as_bytes())
        );
        assert_eq!(
            response
                .headers()
                .get(CONTENT_DISPOSITION)
                .map(|v| v.as_bytes()),
            Some(ARCHIVE_DISPOSITION.as_bytes())
        );
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        assert!(body.starts_with(b"PK"));
        Ok(())
    }

    #[tokio::test]
    async fn refused_delivery_lists_failed_paths() -> Result<(), Box<dyn Error>> {
        let state = state(
            Pipeline::new()
                .with_producer(Writes("manifest.json"))
                .with_producer(Refuses),
        )?;
        let err = package(State(state), query(), Ok(Json(WebAppManifest::default())))
            .await
            .err()
            .ok_or("expected refusal")?;

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let payload: PackageErrorResponse = serde_json::from_slice(&body)?;
        assert_eq!(payload.err_message, "a.png,b.png");
        Ok(())
    }
}
