//! Run command implementation.

use std::fs;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use kvant_adapter_sim::SimulatorBackend;
use kvant_hal::Backend;

use super::common::{EngineArgs, load_circuit, print_results};
use crate::OutputFormat;

/// Execute the run command.
pub async fn execute(
    input: &str,
    shots: u32,
    seed: Option<u64>,
    engine: &EngineArgs,
    format: OutputFormat,
    output: Option<&str>,
) -> Result<()> {
    let table = format == OutputFormat::Table;
    if table {
        println!(
            "{} Running {} ({} shots)",
            style("→").cyan().bold(),
            style(input).green(),
            shots
        );
    }

    // Load circuit
    let circuit = load_circuit(input)?;
    if table {
        println!(
            "  Loaded: {} qubits, {} clbits, depth {}",
            circuit.num_qubits(),
            circuit.num_clbits(),
            circuit.depth()
        );
    }

    let mut backend = SimulatorBackend::with_config(engine.to_config()?);
    if let Some(seed) = seed {
        backend = backend.with_seed(seed);
    }

    // Submit job
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("invalid spinner template")?,
    );
    if !table {
        spinner.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
    spinner.set_message("Submitting job...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let job_id = backend.submit(&circuit, shots).await?;
    spinner.set_message(format!("Running job {job_id}..."));

    // Wait for result
    let result = backend.wait(&job_id).await;
    spinner.finish_and_clear();
    let result = result?;
    info!(%job_id, outcomes = result.counts.len(), "job completed");

    let json = serde_json::to_string_pretty(&result)?;
    if let Some(path) = output {
        fs::write(path, &json).with_context(|| format!("Failed to write output: {path}"))?;
        if table {
            println!("  Wrote {}", style(path).green());
        }
    }

    match format {
        OutputFormat::Table => print_results(&result),
        OutputFormat::Json => println!("{json}"),
    }

    Ok(())
}
