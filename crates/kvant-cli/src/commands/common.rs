//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use kvant_adapter_sim::SimulatorConfig;
use kvant_adapter_sim::config::DEFAULT_CHUNK_SIZE;
use kvant_hal::ExecutionResult;
use kvant_ir::{Circuit, CircuitSpec};

/// Engine settings shared by `run` and `statevector`.
#[derive(Debug, Clone, Args)]
pub struct EngineArgs {
    /// Refuse circuits wider than this many qubits
    #[arg(long, env = "KVANT_MAX_QUBITS")]
    pub max_qubits: Option<u32>,

    /// Worker threads for shot sampling (defaults to all cores)
    #[arg(long, env = "KVANT_THREADS")]
    pub threads: Option<usize>,

    /// Shots per parallel task
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
}

impl EngineArgs {
    /// Build and check the simulator configuration.
    pub fn to_config(&self) -> Result<SimulatorConfig> {
        let mut config = SimulatorConfig::default().with_chunk_size(self.chunk_size);
        if let Some(max_qubits) = self.max_qubits {
            config = config.with_max_qubits(max_qubits);
        }
        if let Some(threads) = self.threads {
            config = config.with_threads(threads);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Load a circuit from a JSON or YAML description.
pub fn load_circuit(path: &str) -> Result<Circuit> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        anyhow::bail!("File not found: {path}");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;

    let ext = path_obj.extension().and_then(|e| e.to_str()).unwrap_or("");

    let spec = match ext.to_lowercase().as_str() {
        "json" => CircuitSpec::from_json(&source),
        "yaml" | "yml" => CircuitSpec::from_yaml(&source),
        other => anyhow::bail!("Unsupported circuit format '{other}': expected .json, .yaml or .yml"),
    }
    .with_context(|| format!("Invalid circuit description: {path}"))?;

    spec.build()
        .with_context(|| format!("Failed to build circuit '{}'", spec.name))
}

/// Print execution results as a histogram table.
pub fn print_results(result: &ExecutionResult) {
    println!(
        "\n{} Results ({} shots):",
        style("✓").green().bold(),
        result.shots
    );

    let sorted = result.counts.sorted();
    let total = result.counts.total_shots().max(1) as f64;

    for (bitstring, count) in sorted.iter().take(16) {
        let prob = **count as f64 / total * 100.0;
        let bar_len = (prob / 2.0).round() as usize;
        let bar: String = "█".repeat(bar_len);

        println!(
            "  {}: {:>6} ({:>5.2}%) {}",
            style(bitstring).cyan(),
            count,
            prob,
            style(bar).green()
        );
    }

    if sorted.len() > 16 {
        println!("  ... and {} more outcomes", sorted.len() - 16);
    }

    if let Some(seed) = result.metadata.get("seed") {
        println!("\n  Seed: {}", style(seed).yellow());
    }
    if let Some(time_ms) = result.execution_time_ms {
        println!("  Execution time: {} ms", style(time_ms).yellow());
    }
}
