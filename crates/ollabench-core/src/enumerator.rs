//! Candidate model resolution.
//!
//! An explicit model list always wins and is never truncated by the limit.
//! Otherwise the server's listing is taken in server order, capped at `limit`.
//! Either way a model appears at most once, at its first position.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::error::BenchError;
use crate::model::ModelRef;
use crate::traits::ModelLister;

/// Split a comma-separated model list, dropping blank entries.
pub fn parse_model_list(s: &str) -> Vec<ModelRef> {
    s.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(ModelRef::from)
        .collect()
}

/// Drop repeated models, keeping the first occurrence of each.
fn dedup_in_order(models: impl IntoIterator<Item = ModelRef>) -> Vec<ModelRef> {
    let mut seen = HashSet::new();
    models
        .into_iter()
        .filter(|model| {
            let first = seen.insert(model.clone());
            if !first {
                warn!(model = %model, "ignoring duplicate model");
            }
            first
        })
        .collect()
}

/// Resolve the ordered list of models to benchmark.
///
/// An empty explicit list counts as absent.
pub async fn resolve(
    explicit: Option<&[ModelRef]>,
    limit: usize,
    lister: &dyn ModelLister,
) -> Result<Vec<ModelRef>, BenchError> {
    if let Some(models) = explicit.filter(|m| !m.is_empty()) {
        let models = dedup_in_order(models.iter().cloned());
        info!(count = models.len(), "using explicit model list");
        return Ok(models);
    }

    let discovered = match lister.list_models().await {
        Ok(models) => models,
        Err(e) => {
            warn!("model listing failed: {e}");
            return Err(BenchError::NoModelsAvailable {
                reason: format!("model listing failed: {e}"),
            });
        }
    };

    if discovered.is_empty() {
        return Err(BenchError::NoModelsAvailable {
            reason: "server returned an empty model list".into(),
        });
    }

    let total = discovered.len();
    let selected: Vec<ModelRef> = dedup_in_order(discovered).into_iter().take(limit).collect();
    if selected.is_empty() {
        return Err(BenchError::NoModelsAvailable {
            reason: format!("limit is 0 ({total} models discovered)"),
        });
    }

    info!(discovered = total, selected = selected.len(), "discovered models");
    Ok(selected)
}
