//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Which index space a register allocation targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterSpace {
    /// Qubit index space.
    Quantum,
    /// Classical bit index space.
    Classical,
}

impl std::fmt::Display for RegisterSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegisterSpace::Quantum => write!(f, "quantum"),
            RegisterSpace::Classical => write!(f, "classical"),
        }
    }
}

/// Errors that can occur while allocating registers or building circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A register size was not positive or would overflow its index space.
    #[error("Cannot allocate {space} register{} with size {requested}", format_register(.name))]
    Allocation {
        /// Index space of the request.
        space: RegisterSpace,
        /// Register name, if any.
        name: Option<String>,
        /// Requested size.
        requested: i64,
    },

    /// A register name was declared twice.
    #[error("Register '{0}' is already declared")]
    DuplicateRegister(String),

    /// Qubit not allocated in circuit.
    #[error("Qubit {qubit} not allocated in circuit{}", format_op_context(.gate_name, .op_index))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Gate name for context.
        gate_name: Option<String>,
        /// Index the operation would have had in the circuit.
        op_index: usize,
    },

    /// Classical bit not allocated in circuit.
    #[error("Classical bit {clbit} not allocated in circuit{}", format_op_context(.gate_name, .op_index))]
    ClbitNotFound {
        /// The classical bit that was not found.
        clbit: ClbitId,
        /// Gate name for context.
        gate_name: Option<String>,
        /// Index the operation would have had in the circuit.
        op_index: usize,
    },

    /// A register name does not resolve.
    #[error("Register '{name}' not found{}", format_op_context(&None, .op_index))]
    RegisterNotFound {
        /// The unresolved name.
        name: String,
        /// Index the operation would have had in the circuit.
        op_index: usize,
    },

    /// Gate requires a different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got} (operation #{op_index})")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
        /// Index the operation would have had in the circuit.
        op_index: usize,
    },

    /// Duplicate qubit in operation.
    #[error("Duplicate qubit {qubit} in operation{}", format_op_context(.gate_name, .op_index))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Gate name for context.
        gate_name: Option<String>,
        /// Index the operation would have had in the circuit.
        op_index: usize,
    },

    /// Measurement operands do not pair up.
    #[error("Measurement has {qubits} qubits but {clbits} classical bits (operation #{op_index})")]
    MeasureArity {
        /// Number of qubit operands.
        qubits: usize,
        /// Number of classical bit operands.
        clbits: usize,
        /// Index the operation would have had in the circuit.
        op_index: usize,
    },

    /// Unknown gate name in a circuit description.
    #[error("Unknown gate '{name}' (operation #{op_index})")]
    UnknownGate {
        /// The unrecognized gate name.
        name: String,
        /// Index of the descriptor in the description.
        op_index: usize,
    },

    /// A circuit description is structurally invalid.
    #[error("Invalid circuit description: {0}")]
    InvalidSpec(String),

    /// JSON decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML decoding failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl IrError {
    /// Point the error at operation `op_index` of a circuit description.
    ///
    /// Builder errors carry the circuit's instruction index; a description
    /// that broadcasts or fans out needs the index of the descriptor instead.
    pub fn at_op(mut self, index: usize) -> Self {
        match &mut self {
            IrError::QubitNotFound { op_index, .. }
            | IrError::ClbitNotFound { op_index, .. }
            | IrError::RegisterNotFound { op_index, .. }
            | IrError::QubitCountMismatch { op_index, .. }
            | IrError::DuplicateQubit { op_index, .. }
            | IrError::MeasureArity { op_index, .. }
            | IrError::UnknownGate { op_index, .. } => *op_index = index,
            _ => {}
        }
        self
    }

    /// True for the errors raised when an operation's operands do not fit the
    /// gate or the allocated index spaces.
    pub fn is_invalid_operation(&self) -> bool {
        matches!(
            self,
            IrError::QubitNotFound { .. }
                | IrError::ClbitNotFound { .. }
                | IrError::RegisterNotFound { .. }
                | IrError::QubitCountMismatch { .. }
                | IrError::DuplicateQubit { .. }
                | IrError::MeasureArity { .. }
                | IrError::UnknownGate { .. }
        )
    }

    /// True for register allocation failures.
    pub fn is_allocation(&self) -> bool {
        matches!(self, IrError::Allocation { .. })
    }
}

#[allow(clippy::ref_option)]
fn format_op_context(gate_name: &Option<String>, op_index: &usize) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name}, operation #{op_index})"),
        None => format!(" (operation #{op_index})"),
    }
}

#[allow(clippy::ref_option)]
fn format_register(name: &Option<String>) -> String {
    match name {
        Some(name) => format!(" '{name}'"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
