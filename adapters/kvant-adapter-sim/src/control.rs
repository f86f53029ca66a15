//! Classical bit store and condition evaluation.

use tracing::trace;

use kvant_ir::{
    Circuit, ClassicalCondition, ClbitId, ConditionTarget, InstructionKind, IrError, Register,
};

use crate::error::{SimError, SimResult};

/// Classical bits of one shot; a bit is `None` until a measurement writes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassicalStore {
    bits: Vec<Option<bool>>,
}

impl ClassicalStore {
    /// Store with `num_clbits` unwritten bits.
    pub fn new(num_clbits: usize) -> Self {
        Self {
            bits: vec![None; num_clbits],
        }
    }

    /// Record a measurement outcome.
    pub fn write(&mut self, clbit: ClbitId, value: bool) {
        self.bits[clbit.index()] = Some(value);
    }

    /// Whether `clbit` has been written.
    pub fn is_written(&self, clbit: ClbitId) -> bool {
        matches!(self.bits.get(clbit.index()), Some(Some(_)))
    }

    /// Read a bit written earlier in the shot.
    pub fn read(&self, clbit: ClbitId, op_index: usize) -> SimResult<bool> {
        self.bits
            .get(clbit.index())
            .copied()
            .flatten()
            .ok_or(SimError::UnmeasuredClbit { clbit, op_index })
    }

    /// Whether a register reads `value`, bit 0 least significant.
    pub fn register_equals(&self, register: &Register, value: u64, op_index: usize) -> SimResult<bool> {
        let mut equal = true;
        for (offset, flat) in register.indices().enumerate() {
            let bit = self.read(ClbitId(flat), op_index)?;
            let expected = offset < 64 && (value >> offset) & 1 == 1;
            equal &= bit == expected;
        }
        // value bits above the register width can never match
        let width = register.size as usize;
        if width < 64 && value >> width != 0 {
            equal = false;
        }
        Ok(equal)
    }

    /// Final outcome string, highest clbit leftmost; unwritten bits read `0`.
    pub fn bitstring(&self) -> String {
        self.bits
            .iter()
            .rev()
            .map(|b| if b.unwrap_or(false) { '1' } else { '0' })
            .collect()
    }
}

/// Decide whether a conditioned gate fires.
pub fn condition_holds(
    condition: &ClassicalCondition,
    circuit: &Circuit,
    store: &ClassicalStore,
    op_index: usize,
) -> SimResult<bool> {
    let holds = match &condition.target {
        ConditionTarget::Clbit(clbit) => store.read(*clbit, op_index)? == (condition.value != 0),
        ConditionTarget::Register(name) => {
            let register = circuit.creg(name).ok_or_else(|| IrError::RegisterNotFound {
                name: name.clone(),
                op_index,
            })?;
            store.register_equals(register, condition.value, op_index)?
        }
    };
    trace!(op_index, holds, "evaluated condition");
    Ok(holds)
}

/// Clbits a condition reads.
pub fn condition_clbits(condition: &ClassicalCondition, circuit: &Circuit) -> Vec<ClbitId> {
    match &condition.target {
        ConditionTarget::Clbit(clbit) => vec![*clbit],
        ConditionTarget::Register(name) => circuit
            .creg(name)
            .map(|r| r.indices().map(ClbitId).collect())
            .unwrap_or_default(),
    }
}

/// Reject circuits whose conditions read bits no earlier operation measures.
///
/// Program order is the only dependency order, so a single forward pass
/// decides this before any shot runs.
pub fn check_classical_flow(circuit: &Circuit) -> SimResult<()> {
    let mut measured = vec![false; circuit.num_clbits()];
    for (op_index, inst) in circuit.instructions().iter().enumerate() {
        match &inst.kind {
            InstructionKind::Measure => {
                for clbit in &inst.clbits {
                    measured[clbit.index()] = true;
                }
            }
            InstructionKind::Gate(gate) => {
                if let Some(condition) = &gate.condition {
                    for clbit in condition_clbits(condition, circuit) {
                        if !measured[clbit.index()] {
                            return Err(SimError::NeverMeasured { clbit, op_index });
                        }
                    }
                }
            }
            InstructionKind::Reset | InstructionKind::Barrier => {}
        }
    }
    Ok(())
}
