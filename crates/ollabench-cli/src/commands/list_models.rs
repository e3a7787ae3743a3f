//! The `ollabench list-models` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use ollabench_core::traits::ModelLister;
use ollabench_providers::config::load_config_from;
use ollabench_providers::create_client;

pub async fn execute(ollama: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(url) = ollama {
        config.ollama_url = url;
    }

    let client = create_client(&config)?;
    let models = client
        .list_models()
        .await
        .with_context(|| format!("failed to list models at {}", client.base_url()))?;

    if models.is_empty() {
        println!("No models found at {}.", client.base_url());
        return Ok(());
    }

    println!("Models at {}:", client.base_url());
    for model in &models {
        println!("  {model}");
    }

    Ok(())
}
