//! ollabench-providers: Inference server integrations.
//!
//! Implements the `InferenceClient` and `ModelLister` traits for Ollama, plus
//! a scripted mock for tests, and loads the benchmark configuration.

pub mod config;
pub mod error;
pub mod mock;
pub mod ollama;

pub use config::{create_client, load_config, load_config_from, BenchConfig};
pub use error::ProviderError;
pub use ollama::{GenerationOptions, OllamaClient};
