//! Single-shot execution.
//!
//! A shot walks the circuit once in program order with its own statevector
//! and classical store. Its progress is tracked as a [`ShotPhase`]:
//!
//! ```text
//!   Unmeasured ──→ Prepared ──→ Measuring ──→ Conditioned ──→ Finalized
//! ```
//!
//! The phase only ever moves right; a measurement after a conditioned gate
//! leaves the shot in `Conditioned`. Every shot starts again from
//! `Unmeasured` with a fresh `|0…0⟩` state.

use rand::Rng;
use tracing::trace;

use kvant_ir::{Circuit, InstructionKind};

use crate::control::{ClassicalStore, condition_holds};
use crate::error::SimResult;
use crate::measurement::{measure_qubit, reset_qubit};
use crate::statevector::Statevector;

/// Progress of one shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShotPhase {
    /// Fresh state, nothing applied.
    Unmeasured,
    /// Unitary prefix applied.
    Prepared,
    /// A stochastic collapse has happened.
    Measuring,
    /// A classically conditioned gate has been resolved.
    Conditioned,
    /// Final outcome recorded.
    Finalized,
}

/// Private state of one shot.
#[derive(Debug, Clone)]
pub struct ShotContext {
    phase: ShotPhase,
    state: Statevector,
    store: ClassicalStore,
}

impl ShotContext {
    /// Fresh context for `circuit`.
    pub fn new(circuit: &Circuit) -> Self {
        Self {
            phase: ShotPhase::Unmeasured,
            state: Statevector::new(circuit.num_qubits()),
            store: ClassicalStore::new(circuit.num_clbits()),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> ShotPhase {
        self.phase
    }

    /// The shot's statevector.
    pub fn state(&self) -> &Statevector {
        &self.state
    }

    /// The shot's classical bits.
    pub fn store(&self) -> &ClassicalStore {
        &self.store
    }

    fn advance(&mut self, next: ShotPhase) {
        if next > self.phase {
            trace!(from = ?self.phase, to = ?next, "shot phase");
            self.phase = next;
        }
    }

    /// Run every instruction of `circuit` and return the outcome bitstring.
    pub fn run<R: Rng + ?Sized>(&mut self, circuit: &Circuit, rng: &mut R) -> SimResult<String> {
        for (op_index, inst) in circuit.instructions().iter().enumerate() {
            match &inst.kind {
                InstructionKind::Gate(gate) => match &gate.condition {
                    None => {
                        self.state.apply_gate(&gate.kind, &inst.qubits);
                        self.advance(ShotPhase::Prepared);
                    }
                    Some(condition) => {
                        if condition_holds(condition, circuit, &self.store, op_index)? {
                            self.state.apply_gate(&gate.kind, &inst.qubits);
                        }
                        self.advance(ShotPhase::Conditioned);
                    }
                },
                InstructionKind::Measure => {
                    self.advance(ShotPhase::Measuring);
                    for (qubit, clbit) in inst.qubits.iter().zip(&inst.clbits) {
                        let outcome = measure_qubit(&mut self.state, qubit.index(), rng);
                        self.store.write(*clbit, outcome);
                    }
                }
                InstructionKind::Reset => {
                    for qubit in &inst.qubits {
                        reset_qubit(&mut self.state, qubit.index(), rng);
                    }
                    self.advance(ShotPhase::Prepared);
                }
                InstructionKind::Barrier => {}
            }
        }
        self.advance(ShotPhase::Finalized);
        Ok(self.store.bitstring())
    }
}

/// Run one shot of `circuit` with its own context.
pub fn execute_shot<R: Rng + ?Sized>(circuit: &Circuit, rng: &mut R) -> SimResult<String> {
    ShotContext::new(circuit).run(circuit, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::shot_rng;
    use kvant_ir::library::{self, TeleportMode};
    use kvant_ir::{ClassicalCondition, StandardGate};

    #[test]
    fn test_phase_order() {
        assert!(ShotPhase::Unmeasured < ShotPhase::Prepared);
        assert!(ShotPhase::Measuring < ShotPhase::Conditioned);
        assert!(ShotPhase::Conditioned < ShotPhase::Finalized);
    }

    #[test]
    fn test_phases_through_teleportation() {
        let circuit = library::teleportation(TeleportMode::Classical).unwrap();
        let mut ctx = ShotContext::new(&circuit);
        assert_eq!(ctx.phase(), ShotPhase::Unmeasured);

        let outcome = ctx.run(&circuit, &mut shot_rng(5, 0)).unwrap();
        assert_eq!(ctx.phase(), ShotPhase::Finalized);
        assert_eq!(outcome.len(), 3);
        // c_receiver is the highest clbit and always reads 0
        assert!(outcome.starts_with('0'));
    }

    #[test]
    fn test_unitary_only_shot_stays_prepared_until_final() {
        let mut circuit = Circuit::new("test");
        let q = circuit.add_qreg("q", 1).unwrap();
        circuit.x(q[0]).unwrap();

        let mut ctx = ShotContext::new(&circuit);
        let outcome = ctx.run(&circuit, &mut shot_rng(0, 0)).unwrap();
        assert_eq!(outcome, "");
        assert!((ctx.state().probability_one(0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_conditioned_gate_uses_same_shot_outcome() {
        // measure |1⟩ then flip back if it read 1: final measure always 0
        let mut circuit = Circuit::new("test");
        let q = circuit.add_qreg("q", 1).unwrap();
        let c = circuit.add_creg("c", 2).unwrap();
        circuit.x(q[0]).unwrap();
        circuit.measure(q[0], c[0]).unwrap();
        circuit
            .conditional(StandardGate::X, &[q[0]], ClassicalCondition::clbit(c[0], true))
            .unwrap();
        circuit.measure(q[0], c[1]).unwrap();

        for seed in 0..8 {
            assert_eq!(execute_shot(&circuit, &mut shot_rng(seed, 0)).unwrap(), "01");
        }
    }
}
