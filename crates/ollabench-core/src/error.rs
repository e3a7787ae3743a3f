//! Error taxonomy for benchmark runs.
//!
//! Transport failures are recorded per pair and never abort a run; they are
//! returned by [`crate::traits::InferenceClient`] implementations and folded
//! into an [`crate::model::InvocationResult`] by the orchestrator.

use thiserror::Error;

/// Any inability to obtain a usable response from the inference server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The call exceeded its timeout.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The server could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The server does not know the requested model.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The server answered with an error status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Conditions that end a benchmark invocation before any pair runs.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Discovery found nothing to benchmark and no explicit list was given.
    #[error("no models available: {reason}")]
    NoModelsAvailable { reason: String },
}
