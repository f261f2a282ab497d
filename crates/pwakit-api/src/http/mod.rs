//! HTTP surface modules (router, handlers, middleware).

/// Shared constants for HTTP responses.
pub mod constants;
/// Error payload helpers.
pub mod errors;
/// Health and diagnostics endpoints.
pub mod health;
/// Manifest-to-archive endpoint.
pub mod package;
/// Router construction and server host.
pub mod router;
/// Metrics middleware for HTTP requests.
pub mod telemetry;
