//! CLI command implementations.

pub mod common;
pub mod run;
pub mod statevector;
pub mod version;
