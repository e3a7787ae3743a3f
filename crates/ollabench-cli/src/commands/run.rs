//! The default `ollabench` command: run the benchmark.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use ollabench_core::engine::{ProgressReporter, RunConfig, RunOrchestrator};
use ollabench_core::enumerator::{parse_model_list, resolve};
use ollabench_core::model::{InvocationResult, ModelRef, Task, Verdict};
use ollabench_core::report::RunReport;
use ollabench_core::tasks::tasks;
use ollabench_providers::config::{load_config_from, BenchConfig};
use ollabench_providers::create_client;
use ollabench_report::{scorecard, DirectorySink, ReportSink};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Ollama server URL
    #[arg(long)]
    pub ollama: Option<String>,

    /// Comma-separated models to test; bypasses discovery and --limit
    #[arg(long)]
    pub models: Option<String>,

    /// Maximum number of discovered models to test [default: 5]
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output directory [default: runs_complex]
    #[arg(long)]
    pub outdir: Option<PathBuf>,

    /// Per-call timeout in seconds [default: 300]
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl RunArgs {
    /// Flags win over the config file.
    fn apply(&self, config: &mut BenchConfig) {
        if let Some(url) = &self.ollama {
            config.ollama_url = url.clone();
        }
        if let Some(models) = &self.models {
            config.models = parse_model_list(models)
                .into_iter()
                .map(|m| m.to_string())
                .collect();
        }
        if let Some(limit) = self.limit {
            config.limit = limit;
        }
        if let Some(outdir) = &self.outdir {
            config.output_dir = outdir.clone();
        }
        if let Some(timeout) = self.timeout_secs {
            config.timeout_secs = timeout;
        }
    }
}

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_pair_start(&self, model: &ModelRef, task: &Task) {
        eprintln!(
            "  Running {} test on {model}...",
            task.pillar.to_string().to_uppercase()
        );
    }

    fn on_pair_scored(&self, invocation: &InvocationResult, verdict: &Verdict) {
        let status = if verdict.passed { "PASS" } else { "FAIL" };
        eprintln!(
            "     {status} | {:.2}s | {}",
            invocation.latency_ms as f64 / 1000.0,
            verdict.detail
        );
    }

    fn on_pair_failed(&self, invocation: &InvocationResult) {
        eprintln!(
            "     ERROR | {:.2}s | {}",
            invocation.latency_ms as f64 / 1000.0,
            invocation.transport_error.as_deref().unwrap_or("unknown error")
        );
    }

    fn on_run_complete(&self, report: &RunReport) {
        eprintln!(
            "\nComplete: {} pairs, {} passed, {} transport failures ({:.1}s)",
            report.entries().len(),
            report.passed_count(),
            report.failed_count(),
            report.duration_ms as f64 / 1000.0
        );
    }
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let mut config = load_config_from(args.config.as_deref())?;
    args.apply(&mut config);
    anyhow::ensure!(config.timeout_secs >= 1, "timeout must be at least 1 second");

    let client = Arc::new(create_client(&config)?);
    let explicit: Vec<ModelRef> = config.models.iter().map(|m| ModelRef::new(m.as_str())).collect();

    let models = match resolve(Some(explicit.as_slice()), config.limit, client.as_ref()).await {
        Ok(models) => models,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("No models to benchmark at {}: {e}", client.base_url());
            return Ok(());
        }
    };

    let orchestrator = RunOrchestrator::new(
        client.clone(),
        tasks(),
        RunConfig {
            timeout: config.timeout(),
        },
    );
    eprintln!(
        "ollabench v{}: {} models x {} tasks against {}",
        env!("CARGO_PKG_VERSION"),
        models.len(),
        orchestrator.tasks().len(),
        client.base_url()
    );

    let report = orchestrator.run(&models, &ConsoleReporter).await;

    print_scorecard(&report);

    let sink = DirectorySink::new(&config.output_dir);
    let dir = sink.write(&report)?;
    eprintln!("Results saved to: {}", dir.display());

    Ok(())
}

fn print_scorecard(report: &RunReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Model", "Avg Latency", "Logic", "Math", "Coding", "Score"]);

    for score in scorecard(report) {
        let latency = score
            .avg_latency_ms
            .map(|ms| format!("{:.2}s", ms / 1000.0))
            .unwrap_or_else(|| "-".to_string());
        let [logic, math, coding] = score.pillar_cells();
        table.add_row(vec![
            Cell::new(&score.model),
            Cell::new(latency),
            Cell::new(logic),
            Cell::new(math),
            Cell::new(coding),
            Cell::new(format!("{}/{}", score.passed, score.total)),
        ]);
    }

    eprintln!("\n{table}");
}
