//! ollabench CLI: benchmark local Ollama models on logic, math, and coding.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::run::RunArgs;

#[derive(Parser)]
#[command(
    name = "ollabench",
    version,
    about = "Logic, math, and coding benchmark for locally hosted models",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// List models installed on the Ollama server
    ListModels {
        /// Ollama server URL
        #[arg(long)]
        ollama: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two report.json files from earlier runs
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Exit code 1 if any pair regressed from pass to fail
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ollabench=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        None => commands::run::execute(cli.run).await,
        Some(Commands::ListModels { ollama, config }) => {
            commands::list_models::execute(ollama, config).await
        }
        Some(Commands::Compare {
            baseline,
            current,
            fail_on_regression,
            format,
        }) => commands::compare::execute(baseline, current, fail_on_regression, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
