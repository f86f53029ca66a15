//! One step of a circuit: an operation plus the bits it touches.

use serde::{Deserialize, Serialize};

use crate::gate::Gate;
use crate::qubit::{ClbitId, QubitId};

/// What an instruction does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// Unitary gate, applied only when its condition (if any) holds.
    Gate(Gate),
    /// Z-basis measurement; `qubits[i]` is written to `clbits[i]`.
    Measure,
    /// Return each qubit to `|0⟩`.
    Reset,
    /// Layout marker with no effect on the state.
    Barrier,
}

/// An operation bound to its operands.
///
/// For gates, `qubits` is in gate order: controls first, and `qubits[0]` is
/// the most significant bit of the gate's local basis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub qubits: Vec<QubitId>,
    /// Only measurements write classical bits.
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    pub fn gate(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::with_operands(InstructionKind::Gate(gate.into()), qubits, [])
    }

    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self::with_operands(InstructionKind::Measure, [qubit], [clbit])
    }

    pub fn reset(qubit: QubitId) -> Self {
        Self::with_operands(InstructionKind::Reset, [qubit], [])
    }

    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::with_operands(InstructionKind::Barrier, qubits, [])
    }

    fn with_operands(
        kind: InstructionKind,
        qubits: impl IntoIterator<Item = QubitId>,
        clbits: impl IntoIterator<Item = ClbitId>,
    ) -> Self {
        Self {
            kind,
            qubits: qubits.into_iter().collect(),
            clbits: clbits.into_iter().collect(),
        }
    }

    /// A gate with no classical condition.
    pub fn is_unconditional_gate(&self) -> bool {
        self.as_gate().is_some_and(|g| !g.is_conditional())
    }

    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, InstructionKind::Barrier)
    }

    pub fn as_gate(&self) -> Option<&Gate> {
        match &self.kind {
            InstructionKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// Lowercase operation name as used in circuit descriptions.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Reset => "reset",
            InstructionKind::Barrier => "barrier",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{ClassicalCondition, StandardGate};

    #[test]
    fn test_gate_instruction() {
        let inst = Instruction::gate(StandardGate::CX, [QubitId(1), QubitId(0)]);
        assert!(inst.is_unconditional_gate());
        assert_eq!(inst.qubits, vec![QubitId(1), QubitId(0)]);
        assert!(inst.clbits.is_empty());
        assert_eq!(inst.name(), "cx");
    }

    #[test]
    fn test_conditional_gate_instruction() {
        let gate = Gate::standard(StandardGate::Z)
            .with_condition(ClassicalCondition::register("c_sender", 1));
        let inst = Instruction::gate(gate, [QubitId(2)]);
        assert!(!inst.is_unconditional_gate());
        assert_eq!(inst.as_gate().and_then(|g| g.condition.as_ref()).map(|c| c.value), Some(1));
    }

    #[test]
    fn test_measure_and_reset() {
        let m = Instruction::measure(QubitId(0), ClbitId(3));
        assert!(m.is_measure());
        assert_eq!(m.clbits, vec![ClbitId(3)]);
        assert!(m.as_gate().is_none());

        let r = Instruction::reset(QubitId(4));
        assert_eq!(r.name(), "reset");
        assert!(!r.is_measure());
    }

    #[test]
    fn test_barrier_instruction() {
        let inst = Instruction::barrier((0..3).map(QubitId));
        assert!(inst.is_barrier());
        assert_eq!(inst.qubits.len(), 3);
    }
}
