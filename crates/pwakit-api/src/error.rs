//! # Design
//!
//! - Provide a single crate-level error type for API server bootstrap/serve failures.
//! - Keep error messages constant; capture operational context in structured fields.

use std::net::SocketAddr;

use thiserror::Error;

/// Result alias for API server operations.
pub type ApiServerResult<T> = std::result::Result<T, ApiServerError>;

/// Errors raised while binding or serving the API.
#[derive(Debug, Error)]
pub enum ApiServerError {
    /// Binding the API listener failed.
    #[error("failed to bind api listener")]
    Bind {
        /// Address attempted.
        addr: SocketAddr,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Serving the API failed.
    #[error("api server terminated unexpectedly")]
    Serve {
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn api_server_error_display_and_source() {
        let cases = [
            (
                ApiServerError::Bind {
                    addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 7071),
                    source: io::Error::other("in use"),
                },
                "failed to bind api listener",
            ),
            (
                ApiServerError::Serve {
                    source: io::Error::other("reset"),
                },
                "api server terminated unexpectedly",
            ),
        ];
        for (err, message) in cases {
            assert_eq!(err.to_string(), message);
            assert!(err.source().is_some());
        }
    }
}
