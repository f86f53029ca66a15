//! Simulator configuration.

use serde::{Deserialize, Serialize};

use kvant_hal::{BackendConfig, HalError, HalResult};
use kvant_ir::Circuit;

use crate::error::{SimError, SimResult};

/// Widest register the dense engine accepts at all (2^24 amplitudes, 256 MiB).
pub const MAX_DENSE_QUBITS: u32 = 24;

/// Default qubit limit.
pub const DEFAULT_MAX_QUBITS: u32 = 20;

/// Default number of shots per parallel task.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

/// Tuning knobs for statevector runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Largest circuit accepted, at most [`MAX_DENSE_QUBITS`].
    pub max_qubits: u32,
    /// Worker threads for shot execution; `None` uses the global rayon pool.
    pub threads: Option<usize>,
    /// Shots per parallel task.
    pub chunk_size: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_qubits: DEFAULT_MAX_QUBITS,
            threads: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl SimulatorConfig {
    /// Set the qubit limit.
    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: u32) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Set the worker thread count.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Set the number of shots per parallel task.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Check the settings are usable.
    pub fn validate(&self) -> SimResult<()> {
        if self.max_qubits > MAX_DENSE_QUBITS {
            return Err(SimError::Config(format!(
                "max_qubits {} exceeds the dense limit of {MAX_DENSE_QUBITS}",
                self.max_qubits
            )));
        }
        if self.chunk_size == 0 {
            return Err(SimError::Config("chunk_size must be positive".into()));
        }
        if self.threads == Some(0) {
            return Err(SimError::Config("threads must be positive".into()));
        }
        Ok(())
    }

    /// Fail with a dimension error when `circuit` is too wide.
    pub fn check_circuit(&self, circuit: &Circuit) -> SimResult<()> {
        if circuit.num_qubits() > self.max_qubits as usize {
            return Err(SimError::Dimension {
                qubits: circuit.num_qubits(),
                max: self.max_qubits,
            });
        }
        Ok(())
    }

    /// Read `max_qubits`, `threads` and `chunk_size` from backend settings.
    pub fn from_backend_config(config: &BackendConfig) -> HalResult<Self> {
        let defaults = Self::default();
        let to_u32 = |v: u64| {
            u32::try_from(v).map_err(|_| HalError::Configuration(format!("max_qubits {v} out of range")))
        };

        let sim = Self {
            max_qubits: match config.get_u64("max_qubits")? {
                Some(v) => to_u32(v)?,
                None => defaults.max_qubits,
            },
            threads: config.get_u64("threads")?.map(|v| v as usize),
            chunk_size: config
                .get_u64("chunk_size")?
                .map_or(defaults.chunk_size, |v| v as usize),
        };
        sim.validate()?;
        Ok(sim)
    }
}
