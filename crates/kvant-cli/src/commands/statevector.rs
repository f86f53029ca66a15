//! Statevector command implementation.

use anyhow::Result;
use console::style;
use num_complex::Complex64;
use serde::Serialize;

use kvant_adapter_sim::simulate_statevector_with;

use super::common::{EngineArgs, load_circuit};
use crate::OutputFormat;

/// Amplitudes below this magnitude are left out of the table.
const DISPLAY_EPSILON: f64 = 1e-10;

#[derive(Serialize)]
struct AmplitudeRow {
    basis: String,
    amplitude: Complex64,
    probability: f64,
}

/// Execute the statevector command.
pub fn execute(input: &str, engine: &EngineArgs, format: OutputFormat) -> Result<()> {
    let circuit = load_circuit(input)?;
    let state = simulate_statevector_with(&circuit, &engine.to_config()?)?;

    let rows: Vec<AmplitudeRow> = state
        .amplitudes()
        .iter()
        .enumerate()
        .map(|(index, &amplitude)| AmplitudeRow {
            basis: state.basis_label(index),
            amplitude,
            probability: amplitude.norm_sqr(),
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Table => {
            println!(
                "{} Statevector of {} ({} qubits):\n",
                style("✓").green().bold(),
                style(circuit.name()).cyan(),
                state.num_qubits()
            );
            for row in rows.iter().filter(|r| r.amplitude.norm() > DISPLAY_EPSILON) {
                println!(
                    "  |{}⟩  {:>+.6} {:>+.6}i  ({:>6.2}%)",
                    style(&row.basis).cyan(),
                    row.amplitude.re,
                    row.amplitude.im,
                    row.probability * 100.0
                );
            }
        }
    }

    Ok(())
}
