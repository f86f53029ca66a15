//! Circuit construction.
//!
//! A [`Circuit`] is an ordered list of instructions over a fixed register
//! layout. Every append is validated against the allocator; nothing is
//! executed here.

use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::trace;

use crate::error::{IrError, IrResult};
use crate::gate::{ClassicalCondition, ConditionTarget, Gate, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{Clbit, ClbitId, Qubit, QubitId};
use crate::register::{Register, RegisterAllocator};

/// A named program: registers plus an instruction list.
///
/// Builder methods return `&mut Self` so calls chain with `?`.
#[derive(Debug, Clone, Serialize)]
pub struct Circuit {
    name: String,
    /// Register layout.
    registers: RegisterAllocator,
    /// Instructions in program order.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Empty circuit with no bits.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registers: RegisterAllocator::new(),
            instructions: vec![],
        }
    }

    /// Circuit with `num_qubits` anonymous qubits and `num_clbits` anonymous clbits.
    ///
    /// Either count may be zero. Fails when a count exceeds [`crate::register::MAX_BITS`].
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> IrResult<Self> {
        let mut circuit = Self::new(name);
        if num_qubits > 0 {
            circuit.registers.allocate_qubits(num_qubits)?;
        }
        if num_clbits > 0 {
            circuit.registers.allocate_clbits(num_clbits)?;
        }
        Ok(circuit)
    }

    /// Allocate `count` anonymous qubits.
    pub fn allocate_qubits(&mut self, count: u32) -> IrResult<Vec<QubitId>> {
        self.registers.allocate_qubits(count)
    }

    /// Allocate `count` anonymous classical bits.
    pub fn allocate_clbits(&mut self, count: u32) -> IrResult<Vec<ClbitId>> {
        self.registers.allocate_clbits(count)
    }

    /// Append a named quantum register of `size` qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<QubitId>> {
        self.registers.add_qreg(name, size)
    }

    /// Append a named classical register of `size` bits.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<ClbitId>> {
        self.registers.add_creg(name, size)
    }

    // =========================================================================
    // Gates
    // =========================================================================

    /// Append a gate, optionally conditioned on classical state.
    pub fn add_gate(
        &mut self,
        gate: StandardGate,
        targets: &[QubitId],
        condition: Option<ClassicalCondition>,
    ) -> IrResult<&mut Self> {
        let gate = match condition {
            Some(condition) => Gate::standard(gate).with_condition(condition),
            None => Gate::standard(gate),
        };
        self.push(Instruction::gate(gate, targets.iter().copied()))
    }

    /// Append a gate that only fires when `condition` holds (like `c_if`).
    pub fn conditional(
        &mut self,
        gate: StandardGate,
        targets: &[QubitId],
        condition: ClassicalCondition,
    ) -> IrResult<&mut Self> {
        self.add_gate(gate, targets, Some(condition))
    }

    /// Hadamard.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.add_gate(StandardGate::H, &[qubit], None)
    }

    /// Bit flip.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.add_gate(StandardGate::X, &[qubit], None)
    }

    /// Phase flip.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.add_gate(StandardGate::Z, &[qubit], None)
    }

    /// Z rotation by `theta`.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.add_gate(StandardGate::Rz(theta), &[qubit], None)
    }

    /// Controlled NOT.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.add_gate(StandardGate::CX, &[control, target], None)
    }

    /// Controlled Z, symmetric in its two qubits.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.add_gate(StandardGate::CZ, &[control, target], None)
    }

    /// Controlled phase `e^{i phi}` on |11⟩.
    pub fn cp(&mut self, phi: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.add_gate(StandardGate::CP(phi), &[control, target], None)
    }

    /// Swap `t1` and `t2` when `control` is set.
    pub fn cswap(&mut self, control: QubitId, t1: QubitId, t2: QubitId) -> IrResult<&mut Self> {
        self.add_gate(StandardGate::CSwap, &[control, t1, t2], None)
    }

    // =========================================================================
    // Non-unitary operations
    // =========================================================================

    /// Computational-basis measurement of `qubit` into `clbit`.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.push(Instruction::measure(qubit, clbit))
    }

    /// Measure `qubits[i]` into `clbits[i]` for every `i`.
    pub fn measure_many(&mut self, qubits: &[QubitId], clbits: &[ClbitId]) -> IrResult<&mut Self> {
        if qubits.len() != clbits.len() {
            return Err(IrError::MeasureArity {
                qubits: qubits.len(),
                clbits: clbits.len(),
                op_index: self.instructions.len(),
            });
        }
        for (&q, &c) in qubits.iter().zip(clbits) {
            self.measure(q, c)?;
        }
        Ok(self)
    }

    /// Measure a named quantum register into a named classical register.
    pub fn measure_register(&mut self, qreg: &str, creg: &str) -> IrResult<&mut Self> {
        let op_index = self.instructions.len();
        let qubits = self
            .registers
            .resolve_qubits(qreg)
            .ok_or_else(|| IrError::RegisterNotFound {
                name: qreg.to_owned(),
                op_index,
            })?;
        let clbits = self
            .registers
            .resolve_clbits(creg)
            .ok_or_else(|| IrError::RegisterNotFound {
                name: creg.to_owned(),
                op_index,
            })?;
        self.measure_many(&qubits, &clbits)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::reset(qubit))
    }

    /// Scheduling barrier over `qubits`. No effect on the state.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.push(Instruction::barrier(qubits))
    }

    /// Barrier across every allocated qubit.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = self.registers.qubits().iter().map(|q| q.id).collect();
        self.push(Instruction::barrier(qubits))
    }

    /// Validate and append an instruction.
    pub fn push(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.validate(&instruction)?;
        trace!(
            op_index = self.instructions.len(),
            name = instruction.name(),
            "append"
        );
        self.instructions.push(instruction);
        Ok(self)
    }

    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let op_index = self.instructions.len();
        let gate_name = match &instruction.kind {
            InstructionKind::Gate(g) => Some(g.name().to_owned()),
            _ => None,
        };

        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let expected = gate.num_qubits();
                let got = instruction.qubits.len() as u32;
                if expected != got {
                    return Err(IrError::QubitCountMismatch {
                        gate_name: gate.name().to_owned(),
                        expected,
                        got,
                        op_index,
                    });
                }
                if let Some(condition) = &gate.condition {
                    self.validate_condition(condition, &gate_name, op_index)?;
                }
            }
            InstructionKind::Measure => {
                if instruction.qubits.len() != instruction.clbits.len() {
                    return Err(IrError::MeasureArity {
                        qubits: instruction.qubits.len(),
                        clbits: instruction.clbits.len(),
                        op_index,
                    });
                }
            }
            InstructionKind::Reset | InstructionKind::Barrier => {}
        }

        for (i, &qubit) in instruction.qubits.iter().enumerate() {
            if !self.registers.contains_qubit(qubit) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name,
                    op_index,
                });
            }
            if instruction.qubits[..i].contains(&qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name,
                    op_index,
                });
            }
        }
        for &clbit in &instruction.clbits {
            if !self.registers.contains_clbit(clbit) {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name,
                    op_index,
                });
            }
        }
        Ok(())
    }

    #[allow(clippy::ref_option)]
    fn validate_condition(
        &self,
        condition: &ClassicalCondition,
        gate_name: &Option<String>,
        op_index: usize,
    ) -> IrResult<()> {
        match &condition.target {
            ConditionTarget::Clbit(clbit) if !self.registers.contains_clbit(*clbit) => {
                Err(IrError::ClbitNotFound {
                    clbit: *clbit,
                    gate_name: gate_name.clone(),
                    op_index,
                })
            }
            ConditionTarget::Register(name) if self.registers.creg(name).is_none() => {
                Err(IrError::RegisterNotFound {
                    name: name.clone(),
                    op_index,
                })
            }
            _ => Ok(()),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Allocated qubits.
    pub fn num_qubits(&self) -> usize {
        self.registers.num_qubits()
    }

    /// Allocated classical bits.
    pub fn num_clbits(&self) -> usize {
        self.registers.num_clbits()
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions, barriers included.
    pub fn num_ops(&self) -> usize {
        self.instructions.len()
    }

    pub fn qubits(&self) -> &[Qubit] {
        self.registers.qubits()
    }

    pub fn clbits(&self) -> &[Clbit] {
        self.registers.clbits()
    }

    /// The register layout.
    pub fn registers(&self) -> &RegisterAllocator {
        &self.registers
    }

    /// Look up a classical register by name.
    pub fn creg(&self, name: &str) -> Option<&Register> {
        self.registers.creg(name)
    }

    /// Whether the circuit has no measurement, reset or conditional gate.
    pub fn is_unitary(&self) -> bool {
        self.instructions
            .iter()
            .all(|inst| inst.is_unconditional_gate() || inst.is_barrier())
    }

    /// Whether anything other than a measurement or barrier follows the first
    /// measurement, i.e. whether a shot has to branch on outcomes.
    pub fn has_mid_circuit_measurement(&self) -> bool {
        self.instructions
            .iter()
            .skip_while(|inst| !inst.is_measure())
            .any(|inst| !inst.is_measure() && !inst.is_barrier())
    }

    /// Circuit depth: the longest chain of instructions sharing a qubit or
    /// classical bit. Barriers synchronize their qubits without adding a layer.
    pub fn depth(&self) -> usize {
        let mut qubit_level = vec![0usize; self.num_qubits()];
        let mut clbit_level = vec![0usize; self.num_clbits()];

        for inst in &self.instructions {
            let mut read_clbits: Vec<usize> = inst.clbits.iter().map(|c| c.index()).collect();
            if let Some(cond) = inst.as_gate().and_then(|g| g.condition.as_ref()) {
                match &cond.target {
                    ConditionTarget::Clbit(c) => read_clbits.push(c.index()),
                    ConditionTarget::Register(name) => {
                        if let Some(reg) = self.registers.creg(name) {
                            read_clbits.extend(reg.indices().map(|i| i as usize));
                        }
                    }
                }
            }

            let start = inst
                .qubits
                .iter()
                .map(|q| qubit_level[q.index()])
                .chain(read_clbits.iter().map(|&c| clbit_level[c]))
                .max()
                .unwrap_or(0);
            let level = if inst.is_barrier() { start } else { start + 1 };

            for q in &inst.qubits {
                qubit_level[q.index()] = level;
            }
            for &c in &read_clbits {
                clbit_level[c] = level;
            }
        }

        qubit_level
            .into_iter()
            .chain(clbit_level)
            .max()
            .unwrap_or(0)
    }

    /// Number of instructions per operation name.
    pub fn count_ops(&self) -> FxHashMap<&str, usize> {
        let mut counts = FxHashMap::default();
        for inst in &self.instructions {
            *counts.entry(inst.name()).or_insert(0) += 1;
        }
        counts
    }
}
