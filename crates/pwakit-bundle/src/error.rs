//! # Design
//!
//! - Constant error messages with structured context fields.
//! - `AssetError` is cheap to clone so several outcomes can report one failure.
//! - `BundleError` is reserved for run-level failures; per-asset problems stay in outcomes.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Result type for run-level bundle operations.
pub type BundleResult<T> = Result<T, BundleError>;

/// Errors raised while fetching remote source bytes.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("fetch client construction failed")]
    Client {
        /// Underlying client error.
        source: reqwest::Error,
    },
    /// The request could not be sent or the body could not be read.
    #[error("fetch transport failure")]
    Transport {
        /// URL being fetched.
        url: String,
        /// Underlying client error.
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("fetch returned unsuccessful status")]
    Status {
        /// URL being fetched.
        url: String,
        /// HTTP status code returned.
        status: u16,
    },
    /// The request did not complete within the configured timeout.
    #[error("fetch timed out")]
    Timeout {
        /// URL being fetched.
        url: String,
    },
    /// The body is larger than the configured byte limit.
    #[error("fetched body exceeds size limit")]
    TooLarge {
        /// URL being fetched.
        url: String,
        /// Configured limit in bytes.
        limit: usize,
    },
}

impl FetchError {
    pub(crate) fn transport(url: &Url, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Failure of a single asset, or of a whole producer.
#[derive(Debug, Clone, Error)]
pub enum AssetError {
    /// Remote source bytes could not be fetched.
    #[error("asset source fetch failed")]
    Fetch {
        /// URL that failed.
        url: String,
        /// Underlying fetch error.
        source: Arc<FetchError>,
    },
    /// Acquisition did not finish in time.
    #[error("asset acquisition timed out")]
    Timeout {
        /// Operation that timed out.
        operation: &'static str,
        /// Configured bound that elapsed.
        after: Duration,
    },
    /// Acquisition succeeded but produced no bytes.
    #[error("asset content was empty")]
    EmptyContent {
        /// Archive path the content was destined for.
        path: String,
    },
    /// An icon `src` could not be turned into a fetchable location.
    #[error("asset source is invalid")]
    InvalidSource {
        /// Source reference as declared in the manifest.
        src: String,
        /// Static reason for the failure.
        reason: &'static str,
    },
    /// Requested output dimensions are out of range.
    #[error("asset size is invalid")]
    InvalidSize {
        /// Archive path of the variant.
        path: String,
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// Source bytes are not a decodable image.
    #[error("image decode failed")]
    Decode {
        /// Archive path of the variant.
        path: String,
        /// Underlying image error.
        source: Arc<image::ImageError>,
    },
    /// The derived image could not be encoded.
    #[error("image encode failed")]
    Encode {
        /// Archive path of the variant.
        path: String,
        /// Underlying image error.
        source: Arc<image::ImageError>,
    },
    /// No template exists for the requested name.
    #[error("template not found")]
    TemplateMissing {
        /// Template name that was requested.
        name: String,
    },
    /// A template override exists but could not be read.
    #[error("template read failed")]
    TemplateRead {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: Arc<io::Error>,
    },
    /// The manifest could not be encoded as JSON.
    #[error("manifest json encoding failed")]
    Json {
        /// Archive path the JSON was destined for.
        path: String,
        /// Underlying JSON error.
        source: Arc<serde_json::Error>,
    },
    /// A blocking worker task failed before returning.
    #[error("blocking asset task failed")]
    Blocking {
        /// Operation that was running on the blocking pool.
        operation: &'static str,
        /// Underlying join error.
        source: Arc<tokio::task::JoinError>,
    },
    /// A producer could not contribute anything for this run.
    #[error("producer failed")]
    ProducerFatal {
        /// Identity of the producer.
        producer: String,
        /// Static reason for the failure.
        reason: &'static str,
    },
    /// A producer task panicked.
    #[error("producer panicked")]
    ProducerPanicked {
        /// Identity of the producer.
        producer: String,
    },
}

impl AssetError {
    pub(crate) fn fetch(url: &Url, source: FetchError) -> Self {
        Self::Fetch {
            url: url.to_string(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn decode(path: &str, source: image::ImageError) -> Self {
        Self::Decode {
            path: path.to_string(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn encode(path: &str, source: image::ImageError) -> Self {
        Self::Encode {
            path: path.to_string(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn json(path: &str, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_string(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn invalid_source(src: &str, reason: &'static str) -> Self {
        Self::InvalidSource {
            src: src.to_string(),
            reason,
        }
    }

    pub(crate) fn producer_fatal(producer: &str, reason: &'static str) -> Self {
        Self::ProducerFatal {
            producer: producer.to_string(),
            reason,
        }
    }
}

/// Run-level failures of the bundle pipeline.
#[derive(Debug, Error)]
pub enum BundleError {
    /// At least one task failed, so no archive is delivered.
    #[error("bundle delivery refused")]
    Delivery {
        /// Every failing archive path (or producer identity), in outcome order.
        failed_paths: Vec<String>,
    },
    /// The archive could not be encoded.
    #[error("archive encoding failed")]
    Archive {
        /// Operation that failed.
        operation: &'static str,
        /// Entry being written, when applicable.
        entry: Option<String>,
        /// Underlying zip error.
        source: zip::result::ZipError,
    },
    /// Writing entry bytes into the archive buffer failed.
    #[error("archive io failure")]
    Io {
        /// Operation that failed.
        operation: &'static str,
        /// Entry being written.
        entry: String,
        /// Underlying IO error.
        source: io::Error,
    },
}

impl BundleError {
    pub(crate) fn archive(
        operation: &'static str,
        entry: Option<&str>,
        source: zip::result::ZipError,
    ) -> Self {
        Self::Archive {
            operation,
            entry: entry.map(str::to_string),
            source,
        }
    }

    pub(crate) fn io(operation: &'static str, entry: &str, source: io::Error) -> Self {
        Self::Io {
            operation,
            entry: entry.to_string(),
            source,
        }
    }

    /// Failing paths of a refused delivery; empty for other variants.
    #[must_use]
    pub fn failed_paths(&self) -> &[String] {
        match self {
            Self::Delivery { failed_paths } => failed_paths,
            Self::Archive { .. } | Self::Io { .. } => &[],
        }
    }
}
