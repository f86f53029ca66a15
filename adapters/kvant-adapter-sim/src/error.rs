//! Error types for the simulator.

use thiserror::Error;

use kvant_hal::HalError;
use kvant_ir::{ClbitId, IrError};

/// Errors raised while simulating a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// Circuit is wider than the dense engine is configured for.
    #[error("Circuit has {qubits} qubits but the simulator is limited to {max}")]
    Dimension {
        /// Qubits in the circuit.
        qubits: usize,
        /// Configured maximum.
        max: u32,
    },

    /// A classical bit was read before any measurement wrote it.
    #[error("Classical bit {clbit} read at operation #{op_index} before it was measured")]
    UnmeasuredClbit {
        /// The unwritten bit.
        clbit: ClbitId,
        /// Operation that read it.
        op_index: usize,
    },

    /// A condition depends on a bit that no earlier operation measures.
    #[error("Condition at operation #{op_index} reads {clbit}, which no earlier operation measures")]
    NeverMeasured {
        /// The bit that is never a measurement target.
        clbit: ClbitId,
        /// Operation carrying the condition.
        op_index: usize,
    },

    /// Shot count rejected.
    #[error("Invalid shots: {0}")]
    InvalidShots(String),

    /// Simulator configuration rejected.
    #[error("Invalid simulator configuration: {0}")]
    Config(String),

    /// Worker pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Circuit construction error.
    #[error(transparent)]
    Ir(#[from] IrError),
}

impl SimError {
    /// Whether this is a classical-bit read error.
    pub fn is_measurement_error(&self) -> bool {
        matches!(
            self,
            SimError::UnmeasuredClbit { .. } | SimError::NeverMeasured { .. }
        )
    }
}

impl From<SimError> for HalError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::Dimension { .. } => HalError::CircuitTooLarge(err.to_string()),
            SimError::InvalidShots(msg) => HalError::InvalidShots(msg),
            SimError::Config(msg) => HalError::Configuration(msg),
            SimError::UnmeasuredClbit { .. } | SimError::NeverMeasured { .. } | SimError::Ir(_) => {
                HalError::InvalidCircuit(err.to_string())
            }
            other => HalError::Backend(other.to_string()),
        }
    }
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;
