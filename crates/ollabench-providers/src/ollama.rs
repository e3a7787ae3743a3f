//! Ollama (local LLM) inference client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use ollabench_core::error::TransportError;
use ollabench_core::model::ModelRef;
use ollabench_core::traits::{GenerateRequest, InferenceClient, ModelLister};

use crate::error::ProviderError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_LIST_TIMEOUT_SECS: u64 = 10;

/// Sampling options sent with every generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Low temperature for reproducible logic/math answers.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Generation length cap, in tokens.
    #[serde(default = "default_num_predict")]
    pub num_predict: u32,
    /// Ask the server to constrain output to JSON.
    #[serde(default = "default_json_format")]
    pub json_format: bool,
}

fn default_temperature() -> f64 {
    0.1
}
fn default_num_predict() -> u32 {
    1024
}
fn default_json_format() -> bool {
    true
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            num_predict: default_num_predict(),
            json_format: default_json_format(),
        }
    }
}

/// Client for an Ollama server's generate and tags endpoints.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
    options: GenerationOptions,
    list_timeout: Duration,
}

impl OllamaClient {
    pub fn new(base_url: &str, options: GenerationOptions) -> Result<Self, ProviderError> {
        let base = if base_url.trim().is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url.trim().trim_end_matches('/')
        };

        reqwest::Url::parse(base).map_err(|e| ProviderError::InvalidUrl {
            url: base.to_string(),
            reason: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::ClientBuild(e.to_string()))?;

        Ok(Self {
            base_url: base.to_string(),
            client,
            options,
            list_timeout: Duration::from_secs(DEFAULT_LIST_TIMEOUT_SECS),
        })
    }

    pub fn with_list_timeout(mut self, timeout: Duration) -> Self {
        self.list_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn classify(&self, e: reqwest::Error, timeout: Duration) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(timeout.as_secs())
        } else if e.is_connect() {
            TransportError::Connection(format!(
                "Ollama not reachable at {}. Is it running? Start with: ollama serve",
                self.base_url
            ))
        } else {
            TransportError::Connection(e.to_string())
        }
    }
}

#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelEntry>,
}

#[derive(Deserialize)]
struct OllamaModelEntry {
    name: String,
}

#[async_trait]
impl InferenceClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: &GenerateRequest) -> Result<String, TransportError> {
        let body = OllamaGenerateRequest {
            model: request.model.as_str(),
            prompt: &request.prompt,
            stream: false,
            format: self.options.json_format.then_some("json"),
            options: OllamaOptions {
                temperature: self.options.temperature,
                num_predict: self.options.num_predict,
            },
        };
        debug!(
            prompt_chars = request.prompt.len(),
            timeout_secs = request.timeout.as_secs(),
            "sending generate request"
        );

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e, request.timeout))?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(TransportError::ModelNotFound(format!(
                "Model '{}' not found locally. Pull it with: ollama pull {}",
                request.model, request.model
            )));
        }
        if status >= 400 {
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Http { status, message });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.classify(e, request.timeout))?;
        let api_response: OllamaGenerateResponse = serde_json::from_slice(&bytes)
            .map_err(|e| TransportError::Malformed(format!("failed to parse response: {e}")))?;

        debug!(eval_count = ?api_response.eval_count, "generation complete");
        Ok(api_response.response)
    }
}

#[async_trait]
impl ModelLister for OllamaClient {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn list_models(&self) -> Result<Vec<ModelRef>, TransportError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(self.list_timeout)
            .send()
            .await
            .map_err(|e| self.classify(e, self.list_timeout))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Http { status, message });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.classify(e, self.list_timeout))?;
        let tags: OllamaTagsResponse = serde_json::from_slice(&bytes).map_err(|e| {
            TransportError::Malformed(format!("failed to parse tags response: {e}"))
        })?;

        Ok(tags
            .models
            .into_iter()
            .map(|m| ModelRef::new(m.name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(model: &str, timeout: Duration) -> GenerateRequest {
        GenerateRequest {
            model: model.into(),
            prompt: "Identify the fallacy".into(),
            timeout,
        }
    }

    fn client(uri: &str) -> OllamaClient {
        OllamaClient::new(uri, GenerationOptions::default()).unwrap()
    }

    #[tokio::test]
    async fn successful_generation() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3:8b",
                "stream": false,
                "format": "json",
                "options": {"num_predict": 1024}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3:8b",
                "response": "{\"fallacy_name\": \"Ad Hominem\"}",
                "done": true,
                "eval_count": 12
            })))
            .mount(&server)
            .await;

        let text = client(&server.uri())
            .generate(&request("llama3:8b", Duration::from_secs(5)))
            .await
            .unwrap();
        assert!(text.contains("Ad Hominem"));
    }

    #[tokio::test]
    async fn json_format_can_be_disabled() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "plain"
            })))
            .mount(&server)
            .await;

        let options = GenerationOptions {
            json_format: false,
            ..Default::default()
        };
        let ollama = OllamaClient::new(&server.uri(), options).unwrap();
        ollama
            .generate(&request("m", Duration::from_secs(5)))
            .await
            .unwrap();

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert!(body.get("format").is_none());
    }

    #[tokio::test]
    async fn model_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .generate(&request("nonexistent", Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::ModelNotFound(_)));
    }

    #[tokio::test]
    async fn server_error_is_http_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("out of memory"))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .generate(&request("m", Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TransportError::Http {
                status: 500,
                message: "out of memory".into()
            }
        );
    }

    #[tokio::test]
    async fn malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .generate(&request("m", Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Malformed(_)));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"response": "late"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .generate(&request("m", Duration::from_millis(200)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Timeout(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_connection_failure() {
        let err = client("http://127.0.0.1:1")
            .generate(&request("m", Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)));
    }

    #[tokio::test]
    async fn dynamic_model_listing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [
                    {"name": "llama3.1:70b", "size": 40000000000_u64},
                    {"name": "codellama:13b", "size": 7000000000_u64}
                ]
            })))
            .mount(&server)
            .await;

        let models = client(&server.uri()).list_models().await.unwrap();
        assert_eq!(models, vec![ModelRef::new("llama3.1:70b"), ModelRef::new("codellama:13b")]);
    }

    #[test]
    fn base_url_normalization() {
        let ollama = client("http://localhost:11434/");
        assert_eq!(ollama.base_url(), "http://localhost:11434");
        assert_eq!(client("").base_url(), DEFAULT_BASE_URL);
        assert!(matches!(
            OllamaClient::new("not a url", GenerationOptions::default()),
            Err(ProviderError::InvalidUrl { .. })
        ));
    }
}
