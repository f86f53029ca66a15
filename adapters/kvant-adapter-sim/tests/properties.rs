//! Property-based tests for the statevector engine.
//!
//! Random measurement-free circuits must keep the state normalized, and
//! shot histograms must depend only on the seed.

use kvant_adapter_sim::{CancelToken, SimulatorConfig, run_shots_with, simulate_statevector};
use kvant_ir::{Circuit, ClbitId, QubitId, StandardGate, gate};
use proptest::prelude::*;

/// One catalog gate on distinct, shuffled qubits.
#[derive(Debug, Clone)]
struct GateOp {
    gate: StandardGate,
    qubits: Vec<u32>,
}

impl GateOp {
    fn apply(&self, circuit: &mut Circuit) {
        let targets: Vec<QubitId> = self.qubits[..self.gate.num_qubits() as usize]
            .iter()
            .map(|&q| QubitId(q))
            .collect();
        circuit.add_gate(self.gate, &targets, None).unwrap();
    }
}

fn arb_gate_op(num_qubits: u32) -> impl Strategy<Value = GateOp> {
    (
        0_usize..8,
        -10.0_f64..10.0,
        Just((0..num_qubits).collect::<Vec<_>>()).prop_shuffle(),
    )
        .prop_map(|(index, angle, qubits)| GateOp {
            gate: gate::catalog(angle)[index],
            qubits,
        })
}

/// Circuits on 3-6 qubits with up to 30 catalog gates.
fn arb_unitary_circuit() -> impl Strategy<Value = Circuit> {
    (3_u32..=6).prop_flat_map(|num_qubits| {
        prop::collection::vec(arb_gate_op(num_qubits), 0..=30).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("random", num_qubits, 0).unwrap();
            for op in &ops {
                op.apply(&mut circuit);
            }
            circuit
        })
    })
}

/// The same circuits with every qubit measured at the end.
fn arb_measured_circuit() -> impl Strategy<Value = Circuit> {
    arb_unitary_circuit().prop_map(|unitary| {
        let n = unitary.num_qubits() as u32;
        let mut circuit = Circuit::with_size("random_measured", n, n).unwrap();
        for inst in unitary.instructions() {
            circuit.push(inst.clone()).unwrap();
        }
        let qubits: Vec<_> = (0..n).map(QubitId).collect();
        let clbits: Vec<_> = (0..n).map(ClbitId).collect();
        circuit.measure_many(&qubits, &clbits).unwrap();
        circuit
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn unitary_circuits_preserve_norm(circuit in arb_unitary_circuit()) {
        let state = simulate_statevector(&circuit).unwrap();
        prop_assert!((state.norm_sqr() - 1.0).abs() < 1e-9);

        let total: f64 = state.probabilities().iter().sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn histograms_depend_only_on_seed(
        circuit in arb_measured_circuit(),
        seed in any::<u64>(),
        threads in 1_usize..=4,
        chunk_size in 1_usize..=50,
    ) {
        let serial = SimulatorConfig::default().with_threads(1);
        let parallel = SimulatorConfig::default()
            .with_threads(threads)
            .with_chunk_size(chunk_size);

        let a = run_shots_with(&circuit, 200, Some(seed), &serial, &CancelToken::new()).unwrap();
        let b = run_shots_with(&circuit, 200, Some(seed), &parallel, &CancelToken::new()).unwrap();
        prop_assert_eq!(&a.counts, &b.counts);
        prop_assert_eq!(a.counts.total_shots(), 200);
        prop_assert!(a.counts.iter().all(|(bits, _)| bits.len() == circuit.num_clbits()));
    }
}
