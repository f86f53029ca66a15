//! Quantum gate types and the gate catalog.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;

use crate::matrix::{self, GateMatrix, ONE};
use crate::qubit::ClbitId;

/// The closed set of gates the engine knows how to simulate.
///
/// Multi-qubit gates list their control qubit(s) first; the first target of an
/// instruction is the most significant bit of the gate's local basis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Pauli-X gate.
    X,
    /// Hadamard gate.
    H,
    /// Pauli-Z gate.
    Z,
    /// Rotation around Z by an angle in radians: `diag(e^{-iθ/2}, e^{iθ/2})`.
    Rz(f64),
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Z gate.
    CZ,
    /// Controlled phase gate: phases `|11⟩` by `e^{iφ}`.
    CP(f64),
    /// Fredkin gate (CSWAP).
    CSwap,
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::X => "x",
            StandardGate::H => "h",
            StandardGate::Z => "z",
            StandardGate::Rz(_) => "rz",
            StandardGate::CX => "cx",
            StandardGate::CZ => "cz",
            StandardGate::CP(_) => "cp",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::X | StandardGate::H | StandardGate::Z | StandardGate::Rz(_) => 1,
            StandardGate::CX | StandardGate::CZ | StandardGate::CP(_) => 2,
            StandardGate::CSwap => 3,
        }
    }

    /// The real parameter of a parametrized gate.
    pub fn parameter(&self) -> Option<f64> {
        match self {
            StandardGate::Rz(theta) | StandardGate::CP(theta) => Some(*theta),
            _ => None,
        }
    }

    /// Build a gate from its name and optional parameter.
    ///
    /// Names are case-insensitive; `cnot`, `cphase` and `fredkin` are accepted
    /// as aliases. Returns `None` for unknown names and when the parameter's
    /// presence does not match [`StandardGate::takes_parameter`].
    pub fn from_name(name: &str, parameter: Option<f64>) -> Option<Self> {
        let gate = match (name.to_ascii_lowercase().as_str(), parameter) {
            ("x", None) => StandardGate::X,
            ("h", None) => StandardGate::H,
            ("z", None) => StandardGate::Z,
            ("rz", Some(theta)) => StandardGate::Rz(theta),
            ("cx" | "cnot", None) => StandardGate::CX,
            ("cz", None) => StandardGate::CZ,
            ("cp" | "cphase", Some(phi)) => StandardGate::CP(phi),
            ("cswap" | "fredkin", None) => StandardGate::CSwap,
            _ => return None,
        };
        Some(gate)
    }

    /// Whether the named gate takes an angle; `None` for unknown names.
    pub fn takes_parameter(name: &str) -> Option<bool> {
        match name.to_ascii_lowercase().as_str() {
            "rz" | "cp" | "cphase" => Some(true),
            "x" | "h" | "z" | "cx" | "cnot" | "cz" | "cswap" | "fredkin" => Some(false),
            _ => None,
        }
    }

    /// The gate's unitary in its local basis (`2^k × 2^k`).
    pub fn matrix(&self) -> GateMatrix {
        match self {
            StandardGate::X => matrix::permutation(2, |c| c ^ 1),
            StandardGate::H => {
                let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
                GateMatrix::from_shape_fn((2, 2), |(r, c)| if r & c == 1 { -s } else { s })
            }
            StandardGate::Z => matrix::diagonal(&[ONE, -ONE]),
            StandardGate::Rz(theta) => matrix::diagonal(&[
                Complex64::from_polar(1.0, -theta / 2.0),
                Complex64::from_polar(1.0, theta / 2.0),
            ]),
            // control is the local MSB: flip the low bit when the high bit is set
            StandardGate::CX => matrix::permutation(4, |c| if c & 0b10 != 0 { c ^ 0b01 } else { c }),
            StandardGate::CZ => matrix::diagonal(&[ONE, ONE, ONE, -ONE]),
            StandardGate::CP(phi) => {
                matrix::diagonal(&[ONE, ONE, ONE, Complex64::from_polar(1.0, *phi)])
            }
            // |c a b>: swap a and b when c is set, i.e. exchange 101 and 110
            StandardGate::CSwap => matrix::permutation(8, |c| match c {
                0b101 => 0b110,
                0b110 => 0b101,
                other => other,
            }),
        }
    }
}

/// What a classical condition reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionTarget {
    /// A single classical bit.
    Clbit(ClbitId),
    /// A whole classical register, read little-endian (register bit 0 is the
    /// least significant).
    Register(String),
}

/// Classical condition for conditional gates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalCondition {
    /// The bit or register the condition reads.
    pub target: ConditionTarget,
    /// The value the target must equal for the gate to fire.
    pub value: u64,
}

impl ClassicalCondition {
    /// Condition on a classical register's value.
    pub fn register(name: impl Into<String>, value: u64) -> Self {
        Self {
            target: ConditionTarget::Register(name.into()),
            value,
        }
    }

    /// Condition on a single classical bit.
    pub fn clbit(clbit: ClbitId, value: bool) -> Self {
        Self {
            target: ConditionTarget::Clbit(clbit),
            value: u64::from(value),
        }
    }
}

/// A gate with an optional classical condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: StandardGate,
    /// Optional classical condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<ClassicalCondition>,
}

impl Gate {
    /// Create an unconditional gate.
    pub fn standard(gate: StandardGate) -> Self {
        Self {
            kind: gate,
            condition: None,
        }
    }

    /// Add a classical condition to the gate.
    #[must_use]
    pub fn with_condition(mut self, condition: ClassicalCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }

    /// Whether the gate is classically conditioned.
    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}

/// Every gate of the catalog with representative parameters.
pub fn catalog(angle: f64) -> [StandardGate; 8] {
    [
        StandardGate::X,
        StandardGate::H,
        StandardGate::Z,
        StandardGate::Rz(angle),
        StandardGate::CX,
        StandardGate::CZ,
        StandardGate::CP(angle),
        StandardGate::CSwap,
    ]
}
