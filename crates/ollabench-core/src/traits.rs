//! Seams to the inference server.
//!
//! Implemented by `ollabench-providers` for Ollama; tests inject fakes.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::model::ModelRef;

/// Request to generate text for one prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier on the server.
    pub model: ModelRef,
    /// The complete prompt.
    pub prompt: String,
    /// Upper bound on the whole call.
    pub timeout: Duration,
}

/// A backend that turns prompts into generated text.
///
/// Implementations must not retry; a failed call is final for its pair.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Human-readable backend name (e.g. "ollama").
    fn name(&self) -> &str;

    /// Generate text, returning the raw response or the transport failure.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, TransportError>;
}

/// A backend that can enumerate its installed models.
#[async_trait]
pub trait ModelLister: Send + Sync {
    /// Model identifiers in server order.
    async fn list_models(&self) -> Result<Vec<ModelRef>, TransportError>;
}
