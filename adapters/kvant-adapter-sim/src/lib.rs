//! Kvant Local Statevector Simulator
//!
//! This crate executes [`kvant_ir::Circuit`]s on a dense statevector. It
//! covers both ways the circuits are consumed:
//!
//! - [`simulate_statevector`] applies the unitary prefix and returns the
//!   final amplitudes
//! - [`run_shots`] re-runs the full probabilistic protocol per shot,
//!   including mid-circuit measurement, reset and classically conditioned
//!   gates, and tallies the final classical bitstrings
//!
//! [`SimulatorBackend`] wraps the shot engine behind the async
//! [`kvant_hal::Backend`] job interface.
//!
//! # Performance
//!
//! | Qubits | Memory | Simulation Speed |
//! |--------|--------|------------------|
//! | 10 | ~16 KB | Instant |
//! | 15 | ~512 KB | Fast |
//! | 20 | ~16 MB | Moderate |
//! | 24 | ~256 MB | Slow, hard limit |
//!
//! # Example
//!
//! ```rust
//! use kvant_adapter_sim::run_shots;
//! use kvant_ir::library;
//!
//! let circuit = library::bell().unwrap();
//! let counts = run_shots(&circuit, 1000, Some(42)).unwrap();
//!
//! assert_eq!(counts.total_shots(), 1000);
//! assert_eq!(counts.get("01") + counts.get("10"), 0);
//! ```

pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod measurement;
pub mod shot;
mod simulator;
pub mod statevector;

pub use config::SimulatorConfig;
pub use engine::{
    CancelToken, ShotReport, run_shots, run_shots_with, simulate_statevector,
    simulate_statevector_with,
};
pub use error::{SimError, SimResult};
pub use shot::{ShotContext, ShotPhase};
pub use simulator::SimulatorBackend;
pub use statevector::Statevector;
