//! Backend capability introspection.

use serde::{Deserialize, Serialize};

use kvant_ir::StandardGate;

/// What a backend can run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gates.
    pub gate_set: GateSet,
    /// Maximum number of shots per job.
    pub max_shots: u32,
    /// Whether this is a simulator (`true`) or hardware (`false`).
    pub is_simulator: bool,
    /// Capability flags such as `"statevector"` or `"mid_circuit_measurement"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Create capabilities for a statevector simulator.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            gate_set: GateSet::standard(),
            max_shots: 1_000_000,
            is_simulator: true,
            features: vec![
                "statevector".into(),
                "mid_circuit_measurement".into(),
                "classical_control".into(),
                "reset".into(),
            ],
        }
    }

    /// Whether `feature` is advertised.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// Gate names a backend accepts, grouped by arity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateSet {
    /// Single-qubit gates supported.
    pub single_qubit: Vec<String>,
    /// Two-qubit gates supported.
    pub two_qubit: Vec<String>,
    /// Three-qubit gates supported.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub three_qubit: Vec<String>,
}

impl GateSet {
    /// Every gate in the Kvant catalog.
    pub fn standard() -> Self {
        let mut set = Self::default();
        for gate in kvant_ir::gate::catalog(0.0) {
            let name = gate.name().to_owned();
            match gate.num_qubits() {
                1 => set.single_qubit.push(name),
                2 => set.two_qubit.push(name),
                _ => set.three_qubit.push(name),
            }
        }
        set
    }

    /// Whether the gate set contains `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.single_qubit
            .iter()
            .chain(&self.two_qubit)
            .chain(&self.three_qubit)
            .any(|g| g == name)
    }

    /// Whether the gate set contains `gate`.
    pub fn supports(&self, gate: &StandardGate) -> bool {
        self.contains(gate.name())
    }
}
