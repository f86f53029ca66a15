//! Circuit-level entry points: statevector dumps and shot histograms.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use rayon::prelude::*;
use tracing::{debug, instrument};

use kvant_hal::Counts;
use kvant_ir::{Circuit, InstructionKind};

use crate::config::SimulatorConfig;
use crate::control::check_classical_flow;
use crate::error::{SimError, SimResult};
use crate::measurement::shot_rng;
use crate::shot::execute_shot;
use crate::statevector::{PROBABILITY_EPSILON, Statevector};

/// Shared flag that stops a shot run early.
///
/// Clones observe the same flag. Shots already running finish; no new shot
/// starts once the token is cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Histogram of a shot run together with how much of it completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotReport {
    /// Outcomes of the completed shots.
    pub counts: Counts,
    /// Shots that ran to completion.
    pub completed: u64,
    /// Shots requested.
    pub requested: u64,
    /// Base seed the run used.
    pub seed: u64,
}

impl ShotReport {
    /// Whether the run stopped before all requested shots.
    pub fn is_partial(&self) -> bool {
        self.completed < self.requested
    }
}

/// Run the unitary prefix of `circuit` with the default configuration.
pub fn simulate_statevector(circuit: &Circuit) -> SimResult<Statevector> {
    simulate_statevector_with(circuit, &SimulatorConfig::default())
}

/// Run the unitary prefix of `circuit` and return the resulting state.
///
/// Unconditioned gates are applied in order and barriers are skipped. A reset
/// of a qubit that is already `|0⟩` is a no-op. The prefix ends at the first
/// measurement, conditioned gate or effective reset; nothing after it is
/// applied.
#[instrument(skip(circuit, config), fields(name = circuit.name()))]
pub fn simulate_statevector_with(circuit: &Circuit, config: &SimulatorConfig) -> SimResult<Statevector> {
    config.validate()?;
    config.check_circuit(circuit)?;

    let mut state = Statevector::new(circuit.num_qubits());
    for (op_index, inst) in circuit.instructions().iter().enumerate() {
        match &inst.kind {
            InstructionKind::Gate(gate) if gate.condition.is_none() => {
                state.apply_gate(&gate.kind, &inst.qubits);
            }
            InstructionKind::Barrier => {}
            InstructionKind::Reset
                if inst
                    .qubits
                    .iter()
                    .all(|q| state.probability_one(q.index()) <= PROBABILITY_EPSILON) => {}
            _ => {
                debug!(op_index, name = inst.name(), "unitary prefix ends");
                break;
            }
        }
    }
    Ok(state)
}

/// Run `circuit` `shots` times with the default configuration.
pub fn run_shots(circuit: &Circuit, shots: u64, seed: Option<u64>) -> SimResult<Counts> {
    run_shots_with(
        circuit,
        shots,
        seed,
        &SimulatorConfig::default(),
        &CancelToken::new(),
    )
    .map(|report| report.counts)
}

/// Run `circuit` `shots` times and tally the final classical bitstrings.
///
/// Shots run in parallel chunks, each with its own statevector, classical
/// store and random source derived from `seed` and the shot index. Without a
/// seed one is drawn from entropy and reported back.
#[instrument(skip(circuit, config, cancel), fields(name = circuit.name()))]
pub fn run_shots_with(
    circuit: &Circuit,
    shots: u64,
    seed: Option<u64>,
    config: &SimulatorConfig,
    cancel: &CancelToken,
) -> SimResult<ShotReport> {
    if shots == 0 {
        return Err(SimError::InvalidShots("shot count must be positive".into()));
    }
    config.validate()?;
    config.check_circuit(circuit)?;
    check_classical_flow(circuit)?;

    let seed = seed.unwrap_or_else(rand::random);
    let chunk_size = config.chunk_size as u64;
    let num_chunks = shots.div_ceil(chunk_size);
    let completed = AtomicU64::new(0);

    debug!(
        qubits = circuit.num_qubits(),
        shots,
        seed,
        chunks = num_chunks,
        "starting shots"
    );

    let run_chunk = |chunk: u64| -> SimResult<Counts> {
        let mut counts = Counts::new();
        let start = chunk * chunk_size;
        let end = (start + chunk_size).min(shots);
        for shot in start..end {
            if cancel.is_cancelled() {
                break;
            }
            let outcome = execute_shot(circuit, &mut shot_rng(seed, shot))?;
            counts.insert(outcome, 1);
            completed.fetch_add(1, Ordering::Relaxed);
        }
        Ok(counts)
    };
    let tally = || {
        (0..num_chunks)
            .into_par_iter()
            .map(run_chunk)
            .try_reduce(Counts::new, |mut a, b| {
                a.merge(b);
                Ok(a)
            })
    };

    let counts = match config.threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?
            .install(tally)?,
        None => tally()?,
    };

    let report = ShotReport {
        completed: completed.into_inner(),
        counts,
        requested: shots,
        seed,
    };
    if report.is_partial() {
        debug!(completed = report.completed, requested = shots, "shots cancelled");
    } else {
        debug!(outcomes = report.counts.len(), "shots completed");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvant_ir::library;

    #[test]
    fn test_zero_shots_rejected() {
        let circuit = library::bell().unwrap();
        assert!(matches!(
            run_shots(&circuit, 0, Some(1)),
            Err(SimError::InvalidShots(_))
        ));
    }

    #[test]
    fn test_chunking_does_not_change_histogram() {
        let circuit = library::bell().unwrap();
        let cancel = CancelToken::new();
        let small = SimulatorConfig::default().with_chunk_size(3);
        let large = SimulatorConfig::default().with_chunk_size(500).with_threads(2);

        let a = run_shots_with(&circuit, 250, Some(9), &small, &cancel).unwrap();
        let b = run_shots_with(&circuit, 250, Some(9), &large, &cancel).unwrap();
        assert_eq!(a.counts, b.counts);
        assert_eq!(a.completed, 250);
        assert!(!a.is_partial());
    }

    #[test]
    fn test_cancelled_before_start() {
        let circuit = library::bell().unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let report =
            run_shots_with(&circuit, 100, Some(1), &SimulatorConfig::default(), &cancel).unwrap();
        assert_eq!(report.completed, 0);
        assert!(report.counts.is_empty());
        assert!(report.is_partial());
    }

    #[test]
    fn test_prefix_stops_at_measurement() {
        let circuit = library::bell().unwrap();
        let state = simulate_statevector(&circuit).unwrap();
        let probs = state.probabilities();
        assert!((probs[0b00] - 0.5).abs() < 1e-12);
        assert!((probs[0b11] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_prefix_skips_trivial_reset() {
        let mut circuit = Circuit::new("test");
        let q = circuit.add_qreg("q", 2).unwrap();
        circuit.reset(q[0]).unwrap();
        circuit.x(q[1]).unwrap();
        circuit.x(q[0]).unwrap();
        circuit.reset(q[0]).unwrap();
        circuit.x(q[1]).unwrap();

        let state = simulate_statevector(&circuit).unwrap();
        // stops at the second reset: q0 = 1, q1 = 1
        assert!((state.probabilities()[0b11] - 1.0).abs() < 1e-12);
    }
}
