//! Jobs and their lifecycle.
//!
//! States are ordered `Queued < Running < {Completed, Failed, Cancelled}`.
//! A cancelled simulator job may still carry the counts of the shots it
//! finished before the stop was noticed.
//!
//! [`Job::transition`] refuses backward moves; once terminal, a job stays put.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque job handle returned by [`Backend::submit`](crate::Backend::submit).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    /// Wrap an id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Where a job is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Accepted, no shot has started.
    Queued,
    /// Shots are being sampled.
    Running,
    /// Every requested shot finished.
    Completed,
    /// Engine error, with its message.
    Failed(String),
    /// Job was cancelled; completed shots stay available.
    Cancelled,
}

impl JobStatus {
    /// `Completed`, `Failed` or `Cancelled`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed(_) | JobStatus::Cancelled
        )
    }

    /// Queued or running.
    pub fn is_pending(&self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Running)
    }

    /// Only `Completed` counts as success; a cancelled job may still hold
    /// partial counts.
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }

    fn rank(&self) -> u8 {
        match self {
            JobStatus::Queued => 0,
            JobStatus::Running => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Failed(msg) => return write!(f, "failed ({msg})"),
        };
        f.write_str(label)
    }
}

/// Bookkeeping for one submitted shot run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    /// Shots requested at submission.
    pub shots: u32,
    pub created_at: DateTime<Utc>,
    /// Set on the first move to `Running`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Set on the move to a terminal status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

impl Job {
    /// A queued job stamped with the current time.
    pub fn new(id: impl Into<JobId>, shots: u32) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Queued,
            shots,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            backend: None,
        }
    }

    #[must_use]
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Move to `status`, stamping start and finish times.
    ///
    /// Returns `false` and leaves the job untouched when the move would go
    /// backward or leave a terminal state.
    pub fn transition(&mut self, status: JobStatus) -> bool {
        if self.status.is_terminal() || status.rank() < self.status.rank() {
            return false;
        }
        self.status = status;
        if matches!(self.status, JobStatus::Running) && self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
        if self.status.is_terminal() && self.finished_at.is_none() {
            self.finished_at = Some(Utc::now());
        }
        true
    }
}
