//! The backend job interface.
//!
//! ```text
//!   validate() ─→ submit() ─→ status()* ─→ result()
//!                     └────────→ wait() ───────┘
//! ```
//!
//! Everything but `name()` and `capabilities()` is async; `wait()` has a
//! polling default that backends with push notification override.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use kvant_ir::Circuit;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// Named backend settings.
///
/// Anything besides `name` lands in `extra` (flattened in JSON) and is read by
/// the backend's [`BackendFactory::from_config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    /// Settings with no extras.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Set `key` in `extra`.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Read an optional unsigned setting from `extra`.
    pub fn get_u64(&self, key: &str) -> HalResult<Option<u64>> {
        match self.extra.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => value.as_u64().map(Some).ok_or_else(|| {
                HalError::Configuration(format!(
                    "'{key}' must be a non-negative integer, got {value}"
                ))
            }),
        }
    }
}

/// Poll period of the default [`Backend::wait`].
pub const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Polls before the default [`Backend::wait`] gives up (five minutes).
pub const WAIT_MAX_POLLS: u32 = 600;

/// A target that runs circuits as asynchronous shot jobs.
///
/// `capabilities()` is cached at construction, so it is sync and infallible.
/// A submitted job starts `Queued`; `result()` answers
/// [`HalError::ResultNotReady`] until the job is terminal.
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> &Capabilities;

    /// Whether the backend takes jobs right now, and how many are pending.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Check `circuit` without submitting it.
    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult>;

    /// Queue `shots` executions of `circuit`.
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId>;

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Counts of a terminal job.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    /// Ask a pending job to stop. Terminal jobs are left alone.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Block until the job is terminal.
    ///
    /// The default polls [`status`](Backend::status) every
    /// [`WAIT_POLL_INTERVAL`]. Cancelled jobs yield [`HalError::JobCancelled`]
    /// even when partial counts exist; fetch those with `result()`.
    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        for poll in 0..WAIT_MAX_POLLS {
            let status = self.status(job_id).await?;
            debug!(%job_id, poll, %status, "polled job");
            if status.is_pending() {
                tokio::time::sleep(WAIT_POLL_INTERVAL).await;
                continue;
            }
            return match status {
                JobStatus::Failed(msg) => Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => Err(HalError::JobCancelled),
                _ => self.result(job_id).await,
            };
        }
        Err(HalError::Timeout(job_id.to_string()))
    }
}

/// Load snapshot of a backend.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    pub is_available: bool,
    /// Jobs queued or running, when the backend knows.
    pub queue_depth: Option<u32>,
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Accepting jobs with `queue_depth` still pending.
    pub fn with_queue(queue_depth: u32) -> Self {
        Self {
            is_available: true,
            queue_depth: Some(queue_depth),
            status_message: (queue_depth > 0).then(|| format!("{queue_depth} job(s) pending")),
        }
    }
}

/// Outcome of [`Backend::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    /// Every problem found, in circuit order.
    Invalid { reasons: Vec<String> },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Backends constructible from a [`BackendConfig`].
pub trait BackendFactory: Backend + Sized {
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_config() {
        let config = BackendConfig::new("test")
            .with_extra("max_qubits", serde_json::json!(12))
            .with_extra("threads", serde_json::json!("four"));

        assert_eq!(config.name, "test");
        assert_eq!(config.get_u64("max_qubits").unwrap(), Some(12));
        assert_eq!(config.get_u64("seed").unwrap(), None);
        assert!(matches!(
            config.get_u64("threads"),
            Err(HalError::Configuration(_))
        ));
    }

    #[test]
    fn test_backend_config_flattened() {
        let config: BackendConfig =
            serde_json::from_str(r#"{"name": "simulator", "seed": 7}"#).unwrap();
        assert_eq!(config.get_u64("seed").unwrap(), Some(7));
    }

    #[test]
    fn test_backend_availability() {
        let idle = BackendAvailability::with_queue(0);
        assert!(idle.is_available);
        assert_eq!(idle.queue_depth, Some(0));
        assert!(idle.status_message.is_none());

        let busy = BackendAvailability::with_queue(3);
        assert_eq!(busy.status_message.as_deref(), Some("3 job(s) pending"));
    }

    #[test]
    fn test_validation_result_is_valid() {
        assert!(ValidationResult::Valid.is_valid());
        assert!(!ValidationResult::Invalid { reasons: vec![] }.is_valid());
    }
}
