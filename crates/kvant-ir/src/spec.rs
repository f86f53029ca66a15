//! Declarative circuit descriptions.
//!
//! A [`CircuitSpec`] is the configuration form of a circuit: register
//! declarations plus an ordered list of operation descriptors, loadable from
//! JSON or YAML. [`build_circuit`] turns it into a validated [`Circuit`].
//!
//! ```yaml
//! name: bell
//! qubit_registers: [[q, 2]]
//! classical_registers: [[c, 2]]
//! operations:
//!   - { gate: h, targets: ["q[0]"] }
//!   - { gate: cx, targets: ["q[0]", "q[1]"] }
//!   - barrier
//!   - { measure: q, clbit: c }
//! ```
//!
//! Operands are `register[index]` or a bare register name. A bare name stands
//! for every bit of the register; operands of different lengths broadcast when
//! the shorter one has a single bit, so `{ gate: h, targets: [qreg] }` applies
//! H to each qubit of `qreg`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult, RegisterSpace};
use crate::gate::{ClassicalCondition, StandardGate};
use crate::qubit::QubitId;
use crate::register::RegisterAllocator;

/// `(name, size)` register declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSpec(pub String, pub i64);

/// Classical condition in a descriptor: exactly one of `register`/`clbit`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConditionSpec {
    /// Classical register name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register: Option<String>,
    /// Single classical bit operand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clbit: Option<String>,
    /// Required value.
    pub value: u64,
}

/// Bare `barrier` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    /// Barrier across all qubits.
    Barrier,
}

/// One operation descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperationSpec {
    /// `barrier` across every qubit.
    Keyword(Keyword),
    /// Gate application.
    Gate {
        /// Gate name (`x`, `h`, `z`, `rz`, `cx`, `cz`, `cp`, `cswap`).
        gate: String,
        /// Qubit operands, controls first.
        targets: Vec<String>,
        /// Angle in radians for `rz` and `cp`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        param: Option<f64>,
        /// Optional classical condition.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<ConditionSpec>,
    },
    /// Measurement of qubit operand(s) into classical operand(s).
    Measure {
        /// Qubit operand.
        measure: String,
        /// Classical bit operand.
        clbit: String,
    },
    /// Reset of qubit operand(s) to |0⟩.
    Reset {
        /// Qubit operand.
        reset: String,
    },
    /// Barrier over the listed qubit operands.
    Barrier {
        /// Qubit operands.
        barrier: Vec<String>,
    },
}

fn default_name() -> String {
    "circuit".into()
}

/// Configuration form of a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitSpec {
    /// Circuit name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Quantum registers, allocated in order.
    #[serde(default)]
    pub qubit_registers: Vec<RegisterSpec>,
    /// Classical registers, allocated in order.
    #[serde(default)]
    pub classical_registers: Vec<RegisterSpec>,
    /// Operations in program order.
    #[serde(default)]
    pub operations: Vec<OperationSpec>,
}

impl CircuitSpec {
    /// Parse a JSON description.
    pub fn from_json(source: &str) -> IrResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Parse a YAML description.
    pub fn from_yaml(source: &str) -> IrResult<Self> {
        Ok(serde_yaml_ng::from_str(source)?)
    }

    /// Build the described circuit.
    pub fn build(&self) -> IrResult<Circuit> {
        build_circuit(self)
    }
}

/// Build and validate the circuit a [`CircuitSpec`] describes.
pub fn build_circuit(spec: &CircuitSpec) -> IrResult<Circuit> {
    let mut circuit = Circuit::new(spec.name.clone());

    for RegisterSpec(name, size) in &spec.qubit_registers {
        let size = RegisterAllocator::checked_size(RegisterSpace::Quantum, Some(name), *size)?;
        circuit.add_qreg(name.clone(), size)?;
    }
    for RegisterSpec(name, size) in &spec.classical_registers {
        let size = RegisterAllocator::checked_size(RegisterSpace::Classical, Some(name), *size)?;
        circuit.add_creg(name.clone(), size)?;
    }

    for (op_index, op) in spec.operations.iter().enumerate() {
        apply_operation(&mut circuit, op, op_index).map_err(|err| err.at_op(op_index))?;
    }

    debug!(
        name = circuit.name(),
        qubits = circuit.num_qubits(),
        clbits = circuit.num_clbits(),
        ops = circuit.num_ops(),
        "built circuit from description"
    );
    Ok(circuit)
}

fn qubit_operand(circuit: &Circuit, operand: &str, op_index: usize) -> IrResult<Vec<QubitId>> {
    circuit
        .registers()
        .resolve_qubits(operand)
        .ok_or_else(|| IrError::RegisterNotFound {
            name: operand.to_owned(),
            op_index,
        })
}

fn apply_operation(circuit: &mut Circuit, op: &OperationSpec, op_index: usize) -> IrResult<()> {
    match op {
        OperationSpec::Keyword(Keyword::Barrier) => {
            circuit.barrier_all()?;
        }
        OperationSpec::Barrier { barrier } => {
            let mut qubits = vec![];
            for operand in barrier {
                qubits.extend(qubit_operand(circuit, operand, op_index)?);
            }
            circuit.barrier(qubits)?;
        }
        OperationSpec::Reset { reset } => {
            for q in qubit_operand(circuit, reset, op_index)? {
                circuit.reset(q)?;
            }
        }
        OperationSpec::Measure { measure, clbit } => {
            let qubits = qubit_operand(circuit, measure, op_index)?;
            let clbits = circuit.registers().resolve_clbits(clbit).ok_or_else(|| {
                IrError::RegisterNotFound {
                    name: clbit.clone(),
                    op_index,
                }
            })?;
            circuit.measure_many(&qubits, &clbits)?;
        }
        OperationSpec::Gate {
            gate,
            targets,
            param,
            condition,
        } => {
            let kind = gate_kind(gate, *param, op_index)?;
            let condition = condition
                .as_ref()
                .map(|c| resolve_condition(circuit, c, op_index))
                .transpose()?;

            let operands = targets
                .iter()
                .map(|t| qubit_operand(circuit, t, op_index))
                .collect::<IrResult<Vec<_>>>()?;
            if operands.is_empty() {
                return Err(IrError::QubitCountMismatch {
                    gate_name: kind.name().to_owned(),
                    expected: kind.num_qubits(),
                    got: 0,
                    op_index,
                });
            }
            for qubits in broadcast(&operands, op_index)? {
                circuit.add_gate(kind, &qubits, condition.clone())?;
            }
        }
    }
    Ok(())
}

fn gate_kind(name: &str, param: Option<f64>, op_index: usize) -> IrResult<StandardGate> {
    let unknown = || IrError::UnknownGate {
        name: name.to_owned(),
        op_index,
    };
    match (StandardGate::takes_parameter(name).ok_or_else(unknown)?, param) {
        (true, None) => Err(IrError::InvalidSpec(format!(
            "operation #{op_index}: gate '{name}' is missing its `param`"
        ))),
        (false, Some(_)) => Err(IrError::InvalidSpec(format!(
            "operation #{op_index}: gate '{name}' takes no `param`"
        ))),
        _ => StandardGate::from_name(name, param).ok_or_else(unknown),
    }
}

fn resolve_condition(
    circuit: &Circuit,
    spec: &ConditionSpec,
    op_index: usize,
) -> IrResult<ClassicalCondition> {
    match (&spec.register, &spec.clbit) {
        (Some(register), None) => {
            if circuit.creg(register).is_none() {
                return Err(IrError::RegisterNotFound {
                    name: register.clone(),
                    op_index,
                });
            }
            Ok(ClassicalCondition::register(register.clone(), spec.value))
        }
        (None, Some(operand)) => {
            let clbits = circuit.registers().resolve_clbits(operand).ok_or_else(|| {
                IrError::RegisterNotFound {
                    name: operand.clone(),
                    op_index,
                }
            })?;
            match (clbits.as_slice(), spec.value) {
                ([clbit], value @ (0 | 1)) => Ok(ClassicalCondition::clbit(*clbit, value == 1)),
                ([_], value) => Err(IrError::InvalidSpec(format!(
                    "operation #{op_index}: single-bit condition cannot equal {value}"
                ))),
                _ => Err(IrError::InvalidSpec(format!(
                    "operation #{op_index}: condition clbit '{operand}' names {} bits; use `register`",
                    clbits.len()
                ))),
            }
        }
        _ => Err(IrError::InvalidSpec(format!(
            "operation #{op_index}: condition needs exactly one of `register` or `clbit`"
        ))),
    }
}

/// Zip operand lists into per-application target lists.
fn broadcast(operands: &[Vec<QubitId>], op_index: usize) -> IrResult<Vec<Vec<QubitId>>> {
    let width = operands.iter().map(Vec::len).max().unwrap_or(0);
    if let Some(bad) = operands.iter().find(|o| o.len() != 1 && o.len() != width) {
        return Err(IrError::InvalidSpec(format!(
            "operation #{op_index}: cannot broadcast operands of length {} and {width}",
            bad.len()
        )));
    }
    Ok((0..width)
        .map(|i| {
            operands
                .iter()
                .map(|o| if o.len() == 1 { o[0] } else { o[i] })
                .collect()
        })
        .collect())
}
