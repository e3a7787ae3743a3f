//! Per-pair summary rows and the full-text transcript.

use serde::Serialize;

use ollabench_core::model::{ModelRef, Pillar};
use ollabench_core::report::{RunEntry, RunReport};

const MODEL_RULE: &str = "================================================================================";
const ENTRY_RULE: &str = "----------------------------------------";

/// One row per model × task pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub model: ModelRef,
    pub task_id: String,
    pub pillar: Pillar,
    /// Transport failures render as failing.
    pub passed: bool,
    /// `None` for transport failures.
    pub latency_ms: Option<u64>,
    pub detail: String,
}

impl SummaryRow {
    fn from_entry(entry: &RunEntry) -> Self {
        let invocation = &entry.invocation;
        let (latency_ms, detail) = match (&entry.verdict, &invocation.transport_error) {
            (Some(verdict), _) => (Some(invocation.latency_ms), verdict.detail.clone()),
            (None, Some(error)) => (None, format!("transport error: {error}")),
            (None, None) => (None, "not scored".to_string()),
        };
        Self {
            model: invocation.model.clone(),
            task_id: invocation.task_id.clone(),
            pillar: invocation.pillar,
            passed: entry.passed(),
            latency_ms,
            detail,
        }
    }
}

/// Render a finished run into summary rows and a transcript.
pub fn render(report: &RunReport) -> (Vec<SummaryRow>, String) {
    let rows = report.entries().iter().map(SummaryRow::from_entry).collect();
    (rows, transcript(report))
}

/// Concatenate every raw response (or transport error) in run order.
pub fn transcript(report: &RunReport) -> String {
    let mut out = String::new();
    let mut current: Option<&ModelRef> = None;

    for entry in report.entries() {
        let invocation = &entry.invocation;
        if current != Some(&invocation.model) {
            out.push_str(&format!(
                "\n{MODEL_RULE}\nMODEL: {}\n{MODEL_RULE}\n",
                invocation.model
            ));
            current = Some(&invocation.model);
        }

        out.push_str(&format!(
            "\n--- TEST: {} ({}) ---\n",
            invocation.pillar.to_string().to_uppercase(),
            invocation.task_id
        ));
        match (&invocation.raw_text, &invocation.transport_error) {
            (Some(text), _) => {
                out.push_str(text);
                out.push('\n');
            }
            (None, Some(error)) => out.push_str(&format!("[ERROR] {error}\n")),
            (None, None) => out.push_str("[ERROR] no response\n"),
        }
        out.push_str(ENTRY_RULE);
        out.push('\n');
    }

    out
}
