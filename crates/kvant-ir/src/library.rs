//! Prebuilt protocol circuits.
//!
//! Register names follow the demo programs these circuits come from, so that
//! descriptions, results and renderers agree on labels.

use std::f64::consts::FRAC_PI_4;

use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::gate::{ClassicalCondition, StandardGate};
use crate::qubit::QubitId;

/// Bell state: `(|00⟩ + |11⟩)/√2`, both qubits measured.
pub fn bell() -> IrResult<Circuit> {
    let mut circuit = Circuit::new("bell");
    let q = circuit.add_qreg("q", 2)?;
    let c = circuit.add_creg("c", 2)?;

    circuit.h(q[0])?.cx(q[0], q[1])?.measure_many(&q, &c)?;
    Ok(circuit)
}

/// Phase kickback through a CNOT on the `|+⟩|−⟩` input.
///
/// The target's `|−⟩` eigenphase kicks back onto the control, so both qubits
/// always read `1`.
pub fn phase_kickback() -> IrResult<Circuit> {
    let mut circuit = Circuit::new("phase_kickback");
    let q = circuit.add_qreg("q", 2)?;
    let c = circuit.add_creg("c", 2)?;

    circuit.x(q[1])?;
    circuit.barrier_all()?;
    circuit.h(q[0])?.h(q[1])?;
    circuit.cx(q[0], q[1])?;
    circuit.h(q[0])?.h(q[1])?;
    circuit.barrier_all()?;
    circuit.measure_many(&q, &c)?;
    Ok(circuit)
}

/// Controlled-T kickback onto `|+⟩`, left unmeasured for statevector output.
pub fn basic_phase_kickback() -> IrResult<Circuit> {
    let mut circuit = Circuit::new("basic_phase_kickback");
    let q = circuit.add_qreg("q", 2)?;

    circuit.x(q[1])?.h(q[0])?.cp(FRAC_PI_4, q[0], q[1])?;
    Ok(circuit)
}

/// Single-qubit preparation used by the swap test registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QubitPrep {
    /// `|0⟩`
    Zero,
    /// `|1⟩`
    One,
    /// `|+⟩`
    Plus,
    /// `|−⟩`
    Minus,
}

impl QubitPrep {
    fn apply(self, circuit: &mut Circuit, qubit: QubitId) -> IrResult<()> {
        match self {
            QubitPrep::Zero => {}
            QubitPrep::One => {
                circuit.x(qubit)?;
            }
            QubitPrep::Plus => {
                circuit.h(qubit)?;
            }
            QubitPrep::Minus => {
                circuit.x(qubit)?.h(qubit)?;
            }
        }
        Ok(())
    }
}

/// Preparation of the demo registers: `|+⟩` on bit 0, `|1⟩` on bit 1.
pub const SWAP_DEMO_PREP: [QubitPrep; 2] = [QubitPrep::Plus, QubitPrep::One];

/// Swap test between two 2-qubit registers `q1` and `q2`.
///
/// The ancilla `a` reads `0` with probability `(1 + |⟨ψ|φ⟩|²)/2`: always for
/// identical states, half the time for orthogonal ones.
pub fn swap_test(prep_1: [QubitPrep; 2], prep_2: [QubitPrep; 2]) -> IrResult<Circuit> {
    build_swap_test(prep_1, prep_2, false)
}

/// Swap test with an X on the ancilla before readout, so that identical
/// states read `1`.
pub fn swap_test_inverted(prep_1: [QubitPrep; 2], prep_2: [QubitPrep; 2]) -> IrResult<Circuit> {
    build_swap_test(prep_1, prep_2, true)
}

fn build_swap_test(
    prep_1: [QubitPrep; 2],
    prep_2: [QubitPrep; 2],
    invert_readout: bool,
) -> IrResult<Circuit> {
    let mut circuit = Circuit::new("swap_test");
    let q1 = circuit.add_qreg("q1", 2)?;
    let q2 = circuit.add_qreg("q2", 2)?;
    let a = circuit.add_qreg("a", 1)?[0];
    let c = circuit.add_creg("c", 1)?[0];

    for (i, prep) in prep_1.into_iter().enumerate() {
        prep.apply(&mut circuit, q1[i])?;
    }
    for (i, prep) in prep_2.into_iter().enumerate() {
        prep.apply(&mut circuit, q2[i])?;
    }

    circuit.h(a)?;
    for (&t1, &t2) in q1.iter().zip(&q2) {
        circuit.cswap(a, t1, t2)?;
    }
    circuit.h(a)?;
    if invert_readout {
        circuit.x(a)?;
    }
    circuit.measure(a, c)?;
    Ok(circuit)
}

/// How teleportation applies the receiver's corrections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeleportMode {
    /// Measure sender and entangled qubits, then apply X/Z conditioned on the
    /// classical outcomes.
    Classical,
    /// Replace the conditioned corrections by CX/CZ from the unmeasured
    /// qubits (deferred measurement); only the receiver is measured.
    Coherent,
}

/// The demo teleportation protocol.
///
/// The sender is prepared as `H·Rz(π/4)·H|0⟩` and the receiver undoes that
/// rotation before measuring, so a faithful teleport always reads `0` on
/// `c_receiver`.
pub fn teleportation(mode: TeleportMode) -> IrResult<Circuit> {
    teleport_state(mode, FRAC_PI_4, true)
}

/// Teleport `H·Rz(theta)·H|0⟩` from `q_sender` to `q_receiver`.
///
/// With `undo_preparation` the receiver applies the inverse preparation
/// before its measurement; otherwise it measures the teleported state
/// directly in the Z basis.
pub fn teleport_state(mode: TeleportMode, theta: f64, undo_preparation: bool) -> IrResult<Circuit> {
    let mut circuit = Circuit::new("teleportation");
    let sender = circuit.add_qreg("q_sender", 1)?[0];
    let ep = circuit.add_qreg("q_entangled", 1)?[0];
    let receiver = circuit.add_qreg("q_receiver", 1)?[0];
    let (c_sender, c_ep) = match mode {
        TeleportMode::Classical => (
            Some(circuit.add_creg("c_sender", 1)?[0]),
            Some(circuit.add_creg("c_entangled", 1)?[0]),
        ),
        TeleportMode::Coherent => (None, None),
    };
    let c_receiver = circuit.add_creg("c_receiver", 1)?[0];

    // Entangle ep register with receiver register
    circuit.h(ep)?.cx(ep, receiver)?;
    circuit.barrier_all()?;

    circuit.reset(sender)?;
    circuit.h(sender)?.rz(theta, sender)?.h(sender)?;
    circuit.barrier_all()?;

    circuit.cx(sender, ep)?.h(sender)?;

    match (c_sender, c_ep) {
        (Some(c_sender), Some(c_ep)) => {
            circuit.measure(sender, c_sender)?.measure(ep, c_ep)?;
            circuit.barrier_all()?;
            circuit.conditional(
                StandardGate::X,
                &[receiver],
                ClassicalCondition::register("c_entangled", 1),
            )?;
            circuit.conditional(
                StandardGate::Z,
                &[receiver],
                ClassicalCondition::register("c_sender", 1),
            )?;
        }
        _ => {
            circuit.barrier_all()?;
            circuit.cx(ep, receiver)?.cz(sender, receiver)?;
        }
    }
    circuit.barrier_all()?;

    if undo_preparation {
        circuit.h(receiver)?.rz(-theta, receiver)?.h(receiver)?;
    }
    circuit.measure(receiver, c_receiver)?;
    Ok(circuit)
}

/// Prepare `H·Rz(theta)·H|0⟩` on a single qubit and measure it.
///
/// Reference distribution for [`teleport_state`] without undo.
pub fn prepared_state(theta: f64) -> IrResult<Circuit> {
    let mut circuit = Circuit::new("prepared_state");
    let q = circuit.add_qreg("q", 1)?[0];
    let c = circuit.add_creg("c", 1)?[0];
    circuit.h(q)?.rz(theta, q)?.h(q)?.measure(q, c)?;
    Ok(circuit)
}

/// Oracle for [`deutsch_jozsa`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Oracle {
    /// `f(x) = value` for every input.
    Constant(bool),
    /// `f(x) = parity(x & mask)`; balanced for any non-zero mask.
    Balanced(u64),
}

/// Deutsch–Jozsa over `n` input qubits with one ancilla.
///
/// The input register reads all zeros exactly when the oracle is constant.
pub fn deutsch_jozsa(n: u32, oracle: Oracle) -> IrResult<Circuit> {
    if let Oracle::Balanced(mask) = oracle {
        let in_range = n >= 64 || mask >> n == 0;
        if mask == 0 || !in_range {
            return Err(IrError::InvalidSpec(format!(
                "balanced oracle mask {mask:#b} must be non-zero and fit {n} input qubits"
            )));
        }
    }

    let mut circuit = Circuit::new("deutsch_jozsa");
    let qreg = circuit.add_qreg("qreg", n)?;
    let ancilla = circuit.add_qreg("ancillary", 1)?[0];
    let creg = circuit.add_creg("creg", n)?;

    circuit.x(ancilla)?.h(ancilla)?;
    for &q in &qreg {
        circuit.h(q)?;
    }
    circuit.barrier_all()?;

    match oracle {
        Oracle::Constant(false) => {}
        Oracle::Constant(true) => {
            circuit.x(ancilla)?;
        }
        Oracle::Balanced(mask) => {
            for (i, &q) in qreg.iter().enumerate() {
                if (mask >> i) & 1 == 1 {
                    circuit.cx(q, ancilla)?;
                }
            }
        }
    }
    circuit.barrier_all()?;

    for &q in &qreg {
        circuit.h(q)?;
    }
    circuit.measure_many(&qreg, &creg)?;
    Ok(circuit)
}

/// Probability that `H·Rz(theta)·H|0⟩` reads `1`.
pub fn prepared_state_p1(theta: f64) -> f64 {
    (theta / 2.0).sin().powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_bell_layout() {
        let circuit = bell().unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.depth(), 3);
    }

    #[test]
    fn test_swap_test_layout() {
        let circuit = swap_test(SWAP_DEMO_PREP, SWAP_DEMO_PREP).unwrap();
        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(circuit.num_clbits(), 1);
        let cswaps = circuit
            .instructions()
            .iter()
            .filter(|i| i.name() == "cswap")
            .count();
        assert_eq!(cswaps, 2);

        let inverted = swap_test_inverted(SWAP_DEMO_PREP, SWAP_DEMO_PREP).unwrap();
        assert_eq!(inverted.num_ops(), circuit.num_ops() + 1);
    }

    #[test]
    fn test_teleportation_modes() {
        let classical = teleportation(TeleportMode::Classical).unwrap();
        assert_eq!(classical.num_clbits(), 3);
        assert!(classical.has_mid_circuit_measurement());
        assert!(classical.creg("c_receiver").is_some());

        let coherent = teleportation(TeleportMode::Coherent).unwrap();
        assert_eq!(coherent.num_clbits(), 1);
        assert!(!coherent.has_mid_circuit_measurement());
        assert!(
            coherent
                .instructions()
                .iter()
                .all(|i| i.as_gate().is_none_or(|g| !g.is_conditional()))
        );
    }

    #[test]
    fn test_deutsch_jozsa_validation() {
        assert!(deutsch_jozsa(3, Oracle::Balanced(0)).is_err());
        assert!(deutsch_jozsa(3, Oracle::Balanced(0b1000)).is_err());
        assert!(deutsch_jozsa(0, Oracle::Constant(false)).unwrap_err().is_allocation());

        let circuit = deutsch_jozsa(3, Oracle::Balanced(0b101)).unwrap();
        assert_eq!(circuit.num_qubits(), 4);
        assert_eq!(circuit.num_clbits(), 3);
    }

    #[test]
    fn test_prepared_state_probability() {
        assert!((45f64.to_radians() - FRAC_PI_4).abs() < 1e-15);
        assert!((prepared_state_p1(PI) - 1.0).abs() < 1e-15);
        assert!(prepared_state_p1(0.0).abs() < 1e-15);
    }
}
