//! Shared HTTP constants (headers, content types, payload messages).

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

pub(crate) const CONTENT_TYPE_ZIP: &str = "application/zip";
pub(crate) const CONTENT_TYPE_METRICS: &str = "text/plain; version=0.0.4";
pub(crate) const ARCHIVE_DISPOSITION: &str = "attachment; filename=\"pwa.zip\"";

pub(crate) const MESSAGE_DELIVERY_REFUSED: &str = "failed to create your web package";
pub(crate) const MESSAGE_BAD_REQUEST: &str = "invalid package request";
pub(crate) const MESSAGE_INTERNAL: &str = "internal server error";

pub(crate) const ROUTE_UNMATCHED: &str = "unmatched";
