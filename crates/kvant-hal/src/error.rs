//! Backend and job errors.

use thiserror::Error;

/// Failures reported through the [`Backend`](crate::Backend) interface.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// The engine gave up on a job; carries the engine's message.
    #[error("job failed: {0}")]
    JobFailed(String),

    /// The job was stopped before all shots ran.
    #[error("job was cancelled before completing")]
    JobCancelled,

    /// No job with this id exists on the backend.
    #[error("unknown job '{0}'")]
    JobNotFound(String),

    /// The job exists but is still queued or running.
    #[error("job '{0}' is still pending")]
    ResultNotReady(String),

    /// The circuit cannot run as written (e.g. reads a bit never measured).
    #[error("circuit rejected: {0}")]
    InvalidCircuit(String),

    /// Result or configuration (de)serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A backend setting is missing, malformed or out of range.
    #[error("bad backend configuration: {0}")]
    Configuration(String),

    /// Polling gave up on the job.
    #[error("gave up waiting for job '{0}'")]
    Timeout(String),

    /// The circuit needs more qubits than the backend offers.
    #[error("circuit too large: {0}")]
    CircuitTooLarge(String),

    /// Shot count is zero or above the backend maximum.
    #[error("invalid shot count: {0}")]
    InvalidShots(String),

    /// Any other engine failure.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Result alias for backend operations.
pub type HalResult<T> = Result<T, HalError>;
