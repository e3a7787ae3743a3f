//! Scripted inference client for testing the harness without a server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use ollabench_core::error::TransportError;
use ollabench_core::model::ModelRef;
use ollabench_core::traits::{GenerateRequest, InferenceClient, ModelLister};

/// A mock inference client.
///
/// Responses are chosen by prompt substring; selected models can be made to
/// fail every call with a fixed transport error.
pub struct MockClient {
    /// Map of prompt substring → response text.
    responses: HashMap<String, String>,
    /// Response if no prompt substring matches.
    default_response: String,
    /// Models whose calls always fail.
    failures: HashMap<ModelRef, TransportError>,
    /// Models reported by `list_models`.
    models: Vec<ModelRef>,
    call_count: AtomicU32,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl MockClient {
    /// Create a mock with the given prompt→response mappings.
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self {
            responses,
            default_response: String::new(),
            failures: HashMap::new(),
            models: Vec::new(),
            call_count: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        let mut mock = Self::new(HashMap::new());
        mock.default_response = response.to_string();
        mock
    }

    /// Make every call for `model` fail with `error`.
    pub fn failing_model(mut self, model: impl Into<ModelRef>, error: TransportError) -> Self {
        self.failures.insert(model.into(), error);
        self
    }

    /// Set the models reported by discovery.
    pub fn with_models(mut self, models: Vec<ModelRef>) -> Self {
        self.models = models;
        self
    }

    /// Number of `generate` calls made.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Every request received, in call order.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl InferenceClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, TransportError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if let Some(err) = self.failures.get(&request.model) {
            return Err(err.clone());
        }

        Ok(self
            .responses
            .iter()
            .find(|(key, _)| request.prompt.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_response.clone()))
    }
}

#[async_trait]
impl ModelLister for MockClient {
    async fn list_models(&self) -> Result<Vec<ModelRef>, TransportError> {
        Ok(self.models.clone())
    }
}
