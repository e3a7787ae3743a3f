//! Run report types with JSON persistence and run-to-run comparison.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{InvocationResult, ModelRef, PairState, Verdict};

/// One model × task pair in its terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEntry {
    pub invocation: InvocationResult,
    /// Present iff the invocation succeeded and was scored.
    pub verdict: Option<Verdict>,
}

impl RunEntry {
    pub fn state(&self) -> PairState {
        if self.verdict.is_some() {
            PairState::Scored
        } else {
            PairState::Failed
        }
    }

    /// Transport failures count as failing.
    pub fn passed(&self) -> bool {
        self.verdict.as_ref().is_some_and(|v| v.passed)
    }
}

/// Append-only record of a whole benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run identifier.
    pub id: Uuid,
    /// When the run started.
    pub created_at: DateTime<Utc>,
    /// Models in enumerator order.
    pub models: Vec<ModelRef>,
    /// Task ids in registry order.
    pub task_ids: Vec<String>,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
    entries: Vec<RunEntry>,
}

impl RunReport {
    pub fn new(models: Vec<ModelRef>, task_ids: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            models,
            task_ids,
            duration_ms: 0,
            entries: Vec::new(),
        }
    }

    /// Record a pair that was invoked and scored.
    pub fn record_scored(&mut self, invocation: InvocationResult, verdict: Verdict) {
        debug_assert!(!invocation.is_failure());
        self.entries.push(RunEntry {
            invocation,
            verdict: Some(verdict),
        });
    }

    /// Record a pair whose invocation failed in transport.
    pub fn record_failed(&mut self, invocation: InvocationResult) {
        debug_assert!(invocation.is_failure());
        self.entries.push(RunEntry {
            invocation,
            verdict: None,
        });
    }

    /// Entries in run order.
    pub fn entries(&self) -> &[RunEntry] {
        &self.entries
    }

    pub fn verdicts(&self) -> impl Iterator<Item = &Verdict> {
        self.entries.iter().filter_map(|e| e.verdict.as_ref())
    }

    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.verdict.is_none()).count()
    }

    pub fn passed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.passed()).count()
    }

    /// Every pair has reached a terminal state.
    pub fn is_complete(&self) -> bool {
        self.entries.len() == self.models.len() * self.task_ids.len()
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: RunReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this run against a baseline run, pair by pair.
    pub fn compare(&self, baseline: &RunReport) -> RunComparison {
        let outcomes = |report: &RunReport| -> HashMap<(ModelRef, String), bool> {
            report
                .entries
                .iter()
                .map(|e| {
                    (
                        (e.invocation.model.clone(), e.invocation.task_id.clone()),
                        e.passed(),
                    )
                })
                .collect()
        };

        let before = outcomes(baseline);
        let after = outcomes(self);

        let mut comparison = RunComparison::default();
        for (key, &now) in &after {
            match before.get(key) {
                Some(&was) if was && !now => comparison.regressions.push(PairChange::new(key)),
                Some(&was) if !was && now => comparison.improvements.push(PairChange::new(key)),
                Some(_) => comparison.unchanged += 1,
                None => comparison.new_pairs += 1,
            }
        }
        comparison.removed_pairs = before.keys().filter(|k| !after.contains_key(k)).count();

        comparison.regressions.sort();
        comparison.improvements.sort();
        comparison
    }
}

/// Result of comparing two runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunComparison {
    /// Pairs that passed in the baseline and fail now.
    pub regressions: Vec<PairChange>,
    /// Pairs that failed in the baseline and pass now.
    pub improvements: Vec<PairChange>,
    pub unchanged: usize,
    pub new_pairs: usize,
    pub removed_pairs: usize,
}

impl RunComparison {
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairChange {
    pub model: ModelRef,
    pub task_id: String,
}

impl PairChange {
    fn new(key: &(ModelRef, String)) -> Self {
        Self {
            model: key.0.clone(),
            task_id: key.1.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::model::{Pillar, ScoringRule, Task};

    fn task(id: &str) -> Task {
        Task {
            id: id.into(),
            pillar: Pillar::Logic,
            prompt: String::new(),
            rule: ScoringRule::Keyword {
                required: vec!["x".into()],
                disqualifiers: vec![],
            },
        }
    }

    fn record(report: &mut RunReport, model: &str, task_id: &str, passed: Option<bool>) {
        let t = task(task_id);
        match passed {
            Some(passed) => report.record_scored(
                InvocationResult::success(model.into(), &t, "text".into(), 10),
                Verdict {
                    task_id: task_id.into(),
                    model: model.into(),
                    passed,
                    detail: String::new(),
                },
            ),
            None => report.record_failed(InvocationResult::failure(
                model.into(),
                &t,
                &TransportError::Timeout(1),
                1000,
            )),
        }
    }

    fn make_report(outcomes: &[(&str, &str, Option<bool>)]) -> RunReport {
        let mut report = RunReport::new(vec![], vec![]);
        for (model, task_id, passed) in outcomes {
            record(&mut report, model, task_id, *passed);
        }
        report
    }

    #[test]
    fn counts_and_completeness() {
        let mut report = RunReport::new(vec!["a".into()], vec!["t1".into(), "t2".into()]);
        record(&mut report, "a", "t1", Some(true));
        assert!(!report.is_complete());
        record(&mut report, "a", "t2", None);
        assert!(report.is_complete());
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.verdicts().count(), 1);
        assert_eq!(report.entries()[1].state(), PairState::Failed);
        assert!(!report.entries()[1].passed());
    }

    #[test]
    fn compare_detects_regressions_and_improvements() {
        let baseline = make_report(&[
            ("a", "t1", Some(true)),
            ("a", "t2", Some(false)),
            ("a", "t3", Some(true)),
            ("a", "old", Some(true)),
        ]);
        let current = make_report(&[
            ("a", "t1", None),
            ("a", "t2", Some(true)),
            ("a", "t3", Some(true)),
            ("a", "new", Some(false)),
        ]);

        let cmp = current.compare(&baseline);
        assert_eq!(cmp.regressions.len(), 1);
        assert_eq!(cmp.regressions[0].task_id, "t1");
        assert_eq!(cmp.improvements.len(), 1);
        assert_eq!(cmp.improvements[0].task_id, "t2");
        assert_eq!(cmp.unchanged, 1);
        assert_eq!(cmp.new_pairs, 1);
        assert_eq!(cmp.removed_pairs, 1);
        assert!(cmp.has_regressions());
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report(&[("a", "t1", Some(true)), ("b", "t1", None)]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = RunReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.entries().len(), 2);
        assert!(loaded.entries()[1].invocation.is_failure());
    }
}
