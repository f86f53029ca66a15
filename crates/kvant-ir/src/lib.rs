//! Kvant circuit representation
//!
//! This crate holds the data structures every other Kvant crate builds on:
//! register allocation, the standard gate catalog with its unitary matrices,
//! and the [`Circuit`] builder that validates instructions as they are
//! appended.
//!
//! # Core Components
//!
//! - **Registers**: [`RegisterAllocator`] maps named quantum and classical
//!   registers onto flat [`QubitId`] / [`ClbitId`] index spaces
//! - **Gates**: [`StandardGate`] for the built-in gates and [`ClassicalCondition`]
//!   for classically controlled application
//! - **Instructions**: [`Instruction`] combining an operation with its operands
//! - **Circuit**: [`Circuit`] ordered, validated instruction list
//! - **Descriptions**: [`CircuitSpec`] loads circuits from JSON or YAML
//! - **Library**: ready-made protocol circuits in [`library`]
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use kvant_ir::{Circuit, ClbitId, QubitId};
//!
//! let mut circuit = Circuit::new("bell_state");
//! let q = circuit.add_qreg("q", 2).unwrap();
//! let c = circuit.add_creg("c", 2).unwrap();
//!
//! circuit.h(q[0]).unwrap();
//! circuit.cx(q[0], q[1]).unwrap();
//! circuit.measure_many(&q, &c).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 3);
//! assert_eq!(c[1], ClbitId(1));
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `X` | 1 | Pauli-X |
//! | `H` | 1 | Hadamard |
//! | `Z` | 1 | Pauli-Z |
//! | `Rz(θ)` | 1 | Z rotation, diag(e^{-iθ/2}, e^{iθ/2}) |
//! | `CX` | 2 | Controlled-NOT |
//! | `CZ` | 2 | Controlled-Z |
//! | `CP(φ)` | 2 | Controlled phase |
//! | `CSwap` | 3 | Fredkin gate |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod library;
pub mod matrix;
pub mod qubit;
pub mod register;
pub mod spec;

pub use circuit::Circuit;
pub use error::{IrError, IrResult, RegisterSpace};
pub use gate::{ClassicalCondition, ConditionTarget, Gate, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use matrix::GateMatrix;
pub use qubit::{Bit, Clbit, ClbitId, Qubit, QubitId};
pub use register::{Register, RegisterAllocator};
pub use spec::{CircuitSpec, OperationSpec, build_circuit};
