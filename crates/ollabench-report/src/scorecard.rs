//! Per-model aggregation across pillars.

use std::collections::BTreeMap;

use serde::Serialize;

use ollabench_core::model::{ModelRef, Pillar};
use ollabench_core::report::RunReport;

/// Aggregate results for one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelScore {
    pub model: ModelRef,
    /// A pillar passes only if every task in it passed.
    pub pillars: BTreeMap<Pillar, bool>,
    pub passed: usize,
    pub total: usize,
    /// Pairs that ended in a transport failure.
    pub failed_calls: usize,
    /// Mean latency over successful calls; `None` if none succeeded.
    pub avg_latency_ms: Option<f64>,
}

impl ModelScore {
    fn new(model: ModelRef) -> Self {
        Self {
            model,
            pillars: BTreeMap::new(),
            passed: 0,
            total: 0,
            failed_calls: 0,
            avg_latency_ms: None,
        }
    }

    /// PASS/FAIL per pillar in `Pillar::ALL` order; `-` if the pillar had no task.
    pub fn pillar_cells(&self) -> [&'static str; 3] {
        Pillar::ALL.map(|p| match self.pillars.get(&p) {
            Some(true) => "PASS",
            Some(false) => "FAIL",
            None => "-",
        })
    }
}

/// Aggregate a run per model, in order of first appearance.
pub fn scorecard(report: &RunReport) -> Vec<ModelScore> {
    let mut order: Vec<ModelRef> = Vec::new();
    for model in report
        .entries()
        .iter()
        .map(|e| &e.invocation.model)
        .chain(report.models.iter())
    {
        if !order.contains(model) {
            order.push(model.clone());
        }
    }

    order
        .into_iter()
        .map(|model| {
            let mut score = ModelScore::new(model.clone());
            let mut latencies = Vec::new();

            for entry in report
                .entries()
                .iter()
                .filter(|e| e.invocation.model == model)
            {
                let passed = entry.passed();
                score.total += 1;
                if passed {
                    score.passed += 1;
                }
                if entry.invocation.is_failure() {
                    score.failed_calls += 1;
                } else {
                    latencies.push(entry.invocation.latency_ms as f64);
                }
                let pillar = score.pillars.entry(entry.invocation.pillar).or_insert(true);
                *pillar &= passed;
            }

            if !latencies.is_empty() {
                score.avg_latency_ms = Some(latencies.iter().sum::<f64>() / latencies.len() as f64);
            }
            score
        })
        .collect()
}
