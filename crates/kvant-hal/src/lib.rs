//! Kvant backend abstraction
//!
//! This crate defines how circuits are handed to an executor and how results
//! come back, independent of the executor itself.
//!
//! - A common [`Backend`] trait for job submission and management
//! - [`Capabilities`] to describe what a backend accepts
//! - Job lifecycle types [`Job`], [`JobId`], [`JobStatus`]
//! - Unified result handling via [`ExecutionResult`] and [`Counts`]
//!
//! # Example: Running a Circuit
//!
//! ```ignore
//! use kvant_hal::Backend;
//! use kvant_adapter_sim::SimulatorBackend;
//! use kvant_ir::library;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let circuit = library::bell()?;
//!     let backend = SimulatorBackend::new();
//!
//!     let job_id = backend.submit(&circuit, 1000).await?;
//!     let result = backend.wait(&job_id).await?;
//!
//!     if let Some((bitstring, count)) = result.counts.most_frequent() {
//!         println!("Most frequent: {} ({} times)", bitstring, count);
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{Backend, BackendAvailability, BackendConfig, BackendFactory, ValidationResult};
pub use capability::{Capabilities, GateSet};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use result::{Counts, ExecutionResult};
