//! Run output destinations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use ollabench_core::report::RunReport;

use crate::csv::{scorecard_csv, summary_csv};
use crate::scorecard::scorecard;
use crate::summary::render;

pub const TRANSCRIPT_FILE: &str = "full_responses.txt";
pub const SUMMARY_FILE: &str = "benchmark_summary.csv";
pub const SCORECARD_FILE: &str = "model_scorecard.csv";
pub const REPORT_FILE: &str = "report.json";

/// Somewhere a finished run can be persisted.
pub trait ReportSink {
    /// Persist the run and return where it went.
    fn write(&self, report: &RunReport) -> Result<PathBuf>;
}

/// Writes each run into its own timestamped subdirectory of `root`.
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn run_dir(&self, report: &RunReport) -> PathBuf {
        let stamp = report
            .created_at
            .with_timezone(&Local)
            .format("%Y%m%d_%H%M%S");
        let dir = self.root.join(format!("bench_complex_{stamp}"));
        if dir.exists() {
            let short_id: String = report.id.simple().to_string().chars().take(8).collect();
            self.root.join(format!("bench_complex_{stamp}_{short_id}"))
        } else {
            dir
        }
    }
}

fn write_file(dir: &Path, name: &str, contents: &str) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, contents)
        .with_context(|| format!("failed to write {}", path.display()))
}

impl ReportSink for DirectorySink {
    fn write(&self, report: &RunReport) -> Result<PathBuf> {
        let dir = self.run_dir(report);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create run directory {}", dir.display()))?;

        let (rows, transcript) = render(report);
        write_file(&dir, TRANSCRIPT_FILE, &transcript)?;
        write_file(&dir, SUMMARY_FILE, &summary_csv(&rows))?;
        write_file(&dir, SCORECARD_FILE, &scorecard_csv(&scorecard(report)))?;
        report.save_json(&dir.join(REPORT_FILE))?;

        info!(dir = %dir.display(), rows = rows.len(), "run output written");
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ollabench_core::error::TransportError;
    use ollabench_core::model::{InvocationResult, Verdict};
    use ollabench_core::tasks::tasks;

    fn small_report() -> RunReport {
        let all = tasks();
        let mut report = RunReport::new(vec!["m".into()], vec![all[0].id.clone(), all[1].id.clone()]);
        report.record_scored(
            InvocationResult::success("m".into(), &all[0], "Ad Hominem".into(), 40),
            Verdict {
                task_id: all[0].id.clone(),
                model: "m".into(),
                passed: true,
                detail: "found required phrase 'ad hominem'".into(),
            },
        );
        report.record_failed(InvocationResult::failure(
            "m".into(),
            &all[1],
            &TransportError::Timeout(300),
            300_000,
        ));
        report
    }

    #[test]
    fn writes_all_files_into_run_directory() {
        let root = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(root.path());
        let report = small_report();

        let dir = sink.write(&report).unwrap();

        assert!(dir.starts_with(root.path()));
        assert!(dir
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("bench_complex_"));
        for name in [TRANSCRIPT_FILE, SUMMARY_FILE, SCORECARD_FILE, REPORT_FILE] {
            assert!(dir.join(name).is_file(), "missing {name}");
        }

        let summary = std::fs::read_to_string(dir.join(SUMMARY_FILE)).unwrap();
        assert_eq!(summary.lines().count(), 3);
        let transcript = std::fs::read_to_string(dir.join(TRANSCRIPT_FILE)).unwrap();
        assert!(transcript.contains("Ad Hominem"));
        assert!(transcript.contains("[ERROR] request timed out after 300s"));
    }

    #[test]
    fn second_run_in_same_second_gets_distinct_directory() {
        let root = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(root.path());
        let first = small_report();
        let mut second = small_report();
        second.created_at = first.created_at;

        let a = sink.write(&first).unwrap();
        let b = sink.write(&second).unwrap();
        assert_ne!(a, b);
    }
}
