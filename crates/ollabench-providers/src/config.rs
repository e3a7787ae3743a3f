//! Benchmark configuration and client factory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ollama::{GenerationOptions, OllamaClient, DEFAULT_BASE_URL};

/// Top-level ollabench configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Base URL of the Ollama server.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
    /// Explicit models to test; empty means discover.
    #[serde(default)]
    pub models: Vec<String>,
    /// Cap on discovered models. Never applied to an explicit list.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Directory that receives one subdirectory per run.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Ceiling for one generate call, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Ceiling for the model listing call, in seconds.
    #[serde(default = "default_list_timeout")]
    pub list_timeout_secs: u64,
    #[serde(default)]
    pub generation: GenerationOptions,
}

fn default_ollama_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_limit() -> usize {
    5
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("runs_complex")
}
fn default_timeout() -> u64 {
    300
}
fn default_list_timeout() -> u64 {
    10
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            ollama_url: default_ollama_url(),
            models: Vec::new(),
            limit: default_limit(),
            output_dir: default_output_dir(),
            timeout_secs: default_timeout(),
            list_timeout_secs: default_list_timeout(),
            generation: GenerationOptions::default(),
        }
    }
}

impl BenchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `ollabench.toml` in the current directory
/// 2. `~/.config/ollabench/config.toml`
///
/// Environment variable override: `OLLABENCH_OLLAMA_URL`.
pub fn load_config() -> Result<BenchConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<BenchConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("ollabench.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => BenchConfig::default(),
    };

    if let Ok(url) = std::env::var("OLLABENCH_OLLAMA_URL") {
        if !url.trim().is_empty() {
            config.ollama_url = url;
        }
    }

    Ok(config)
}

/// Parse a TOML config document, expanding `${VAR}` references.
pub fn parse_config(content: &str) -> Result<BenchConfig> {
    let mut config: BenchConfig = toml::from_str(content)?;
    config.ollama_url = resolve_env_vars(&config.ollama_url);
    config.models = config.models.iter().map(|m| resolve_env_vars(m)).collect();
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("ollabench"))
}

/// Create the Ollama client described by a configuration.
pub fn create_client(config: &BenchConfig) -> Result<OllamaClient> {
    let client = OllamaClient::new(&config.ollama_url, config.generation.clone())
        .context("failed to create Ollama client")?
        .with_list_timeout(Duration::from_secs(config.list_timeout_secs));
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_OLLABENCH_TEST_HOST", "gpu-box");
        assert_eq!(
            resolve_env_vars("http://${_OLLABENCH_TEST_HOST}:11434"),
            "http://gpu-box:11434"
        );
        assert_eq!(resolve_env_vars("no vars"), "no vars");
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_OLLABENCH_TEST_HOST");
    }

    #[test]
    fn resolve_env_vars_does_not_reexpand_values() {
        std::env::set_var("_OLLABENCH_TEST_SELF", "${_OLLABENCH_TEST_SELF}");
        assert_eq!(
            resolve_env_vars("a/${_OLLABENCH_TEST_SELF}/b"),
            "a/${_OLLABENCH_TEST_SELF}/b"
        );
        std::env::remove_var("_OLLABENCH_TEST_SELF");

        std::env::set_var("_OLLABENCH_TEST_A", "x");
        assert_eq!(
            resolve_env_vars("${_OLLABENCH_TEST_A}-${_OLLABENCH_TEST_A}"),
            "x-x"
        );
        assert_eq!(resolve_env_vars("${_OLLABENCH_TEST_A}${oops"), "x${oops");
        std::env::remove_var("_OLLABENCH_TEST_A");
    }

    #[test]
    fn default_config() {
        let config = BenchConfig::default();
        assert_eq!(config.ollama_url, "http://localhost:11434");
        assert_eq!(config.limit, 5);
        assert_eq!(config.output_dir, PathBuf::from("runs_complex"));
        assert_eq!(config.timeout(), Duration::from_secs(300));
        assert!(config.models.is_empty());
        assert!(config.generation.json_format);
    }

    #[test]
    fn parse_partial_config() {
        let config = parse_config(
            r#"
ollama_url = "http://192.168.1.50:11434"
models = ["llama3:8b", "qwen2:7b"]
timeout_secs = 120

[generation]
temperature = 0.0
"#,
        )
        .unwrap();
        assert_eq!(config.ollama_url, "http://192.168.1.50:11434");
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.limit, 5);
        assert_eq!(config.generation.temperature, 0.0);
        assert_eq!(config.generation.num_predict, 1024);
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.toml");
        std::fs::write(&path, "limit = 2\noutput_dir = \"out\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.limit, 2);
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/ollabench.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn create_client_uses_configured_url() {
        let config = BenchConfig {
            ollama_url: "http://10.0.0.2:11434/".into(),
            ..Default::default()
        };
        let client = create_client(&config).unwrap();
        assert_eq!(client.base_url(), "http://10.0.0.2:11434");
    }
}
