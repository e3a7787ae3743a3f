//! Provider construction errors.
//!
//! Failures of individual calls are `ollabench_core::error::TransportError`.

use thiserror::Error;

/// Errors that prevent a client from being built.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The configured base URL does not parse.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}
