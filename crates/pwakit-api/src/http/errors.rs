//! Error payloads for the bundle API.
//!
//! Every non-success response carries the same `{ message, errMessage }` body
//! regardless of which layer produced it.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pwakit_api_models::PackageErrorResponse;

use crate::http::constants::{MESSAGE_BAD_REQUEST, MESSAGE_DELIVERY_REFUSED, MESSAGE_INTERNAL};

/// Structured API error rendered as a [`PackageErrorResponse`].
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    message: &'static str,
    detail: String,
}

impl ApiError {
    const fn new(status: StatusCode, message: &'static str, detail: String) -> Self {
        Self {
            status,
            message,
            detail,
        }
    }

    /// The pipeline refused delivery; `errMessage` lists the failing paths.
    pub(crate) fn delivery_refused(failed_paths: &[String]) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            MESSAGE_DELIVERY_REFUSED,
            failed_paths.join(","),
        )
    }

    /// The request could not be parsed into a bundle request.
    pub(crate) fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, MESSAGE_BAD_REQUEST, detail.into())
    }

    /// The request was rejected before parsing with a specific status (e.g. body too large).
    pub(crate) fn rejected(status: StatusCode, detail: impl Into<String>) -> Self {
        Self::new(status, MESSAGE_BAD_REQUEST, detail.into())
    }

    pub(crate) fn internal(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            MESSAGE_INTERNAL,
            detail.into(),
        )
    }

    pub(crate) fn payload(&self) -> PackageErrorResponse {
        PackageErrorResponse::new(self.message, self.detail.clone())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = self.payload();
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn delivery_refusal_joins_paths_with_commas() {
        let err = ApiError::delivery_refused(&[
            "serviceWorker.js".to_string(),
            "serviceWorker-register.js".to_string(),
        ]);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            err.payload(),
            PackageErrorResponse::new(
                MESSAGE_DELIVERY_REFUSED,
                "serviceWorker.js,serviceWorker-register.js"
            )
        );
    }

    #[tokio::test]
    async fn into_response_renders_json_payload() -> Result<(), Box<dyn std::error::Error>> {
        let response = ApiError::internal("zip writer failed").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let payload: PackageErrorResponse = serde_json::from_slice(&body)?;
        assert_eq!(payload.message, MESSAGE_INTERNAL);
        assert_eq!(payload.err_message, "zip writer failed");
        Ok(())
    }
}
