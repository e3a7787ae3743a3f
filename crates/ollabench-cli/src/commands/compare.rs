//! The `ollabench compare` command.

use std::path::PathBuf;

use anyhow::Result;

use ollabench_core::report::RunReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    let baseline = RunReport::load_json(&baseline_path)?;
    let current = RunReport::load_json(&current_path)?;

    let comparison = current.compare(&baseline);

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        }
        _ => {
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged",
                comparison.regressions.len(),
                comparison.improvements.len(),
                comparison.unchanged
            );

            if !comparison.regressions.is_empty() {
                println!("\nRegressions (PASS -> FAIL):");
                for r in &comparison.regressions {
                    println!("  {} ({})", r.task_id, r.model);
                }
            }

            if !comparison.improvements.is_empty() {
                println!("\nImprovements (FAIL -> PASS):");
                for i in &comparison.improvements {
                    println!("  {} ({})", i.task_id, i.model);
                }
            }

            if comparison.new_pairs > 0 {
                println!("\n{} new pair(s)", comparison.new_pairs);
            }
            if comparison.removed_pairs > 0 {
                println!("{} removed pair(s)", comparison.removed_pairs);
            }
        }
    }

    if fail_on_regression && comparison.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
