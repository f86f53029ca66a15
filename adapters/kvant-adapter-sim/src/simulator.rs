//! [`Backend`] front for the shot engine.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use kvant_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, ExecutionResult,
    HalError, HalResult, Job, JobId, JobStatus, ValidationResult,
};
use kvant_ir::Circuit;

use crate::config::SimulatorConfig;
use crate::control::check_classical_flow;
use crate::engine::{CancelToken, ShotReport, run_shots_with};
use crate::error::SimResult;

/// Bookkeeping for one submitted job.
struct SimJob {
    job: Job,
    cancel: CancelToken,
    result: Option<ExecutionResult>,
    status_tx: watch::Sender<JobStatus>,
}

impl SimJob {
    fn set_status(&mut self, status: JobStatus) {
        if self.job.transition(status) {
            self.status_tx.send_replace(self.job.status.clone());
        }
    }
}

type JobTable = Arc<Mutex<FxHashMap<String, SimJob>>>;

fn lock(jobs: &JobTable) -> MutexGuard<'_, FxHashMap<String, SimJob>> {
    jobs.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Local statevector simulator backend.
///
/// Each submitted job runs on tokio's blocking pool; its shots are spread
/// over rayon workers. Cancelling a job stops it at the next shot boundary
/// and keeps the shots completed so far as the job's result.
pub struct SimulatorBackend {
    config: BackendConfig,
    sim_config: SimulatorConfig,
    /// Derived from `sim_config`.
    capabilities: Capabilities,
    /// Base seed for submitted jobs; `None` draws a fresh one per job.
    seed: Option<u64>,
    jobs: JobTable,
}

impl SimulatorBackend {
    /// Backend with [`SimulatorConfig::default`].
    pub fn new() -> Self {
        Self::with_config(SimulatorConfig::default())
    }

    /// Backend refusing circuits wider than `max_qubits`.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self::with_config(SimulatorConfig::default().with_max_qubits(max_qubits))
    }

    pub fn with_config(sim_config: SimulatorConfig) -> Self {
        Self::assemble(BackendConfig::new("simulator"), sim_config, None)
    }

    fn assemble(config: BackendConfig, sim_config: SimulatorConfig, seed: Option<u64>) -> Self {
        Self {
            capabilities: Capabilities::simulator(sim_config.max_qubits),
            config,
            sim_config,
            seed,
            jobs: JobTable::default(),
        }
    }

    /// Make every submitted job reproducible from `seed`.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Engine settings in use.
    pub fn sim_config(&self) -> &SimulatorConfig {
        &self.sim_config
    }

    fn build_result(report: ShotReport, elapsed_ms: u64) -> ExecutionResult {
        ExecutionResult::new(report.counts, report.completed as u32)
            .with_execution_time(elapsed_ms)
            .with_metadata("seed", serde_json::json!(report.seed))
            .with_metadata("requested_shots", serde_json::json!(report.requested))
            .with_metadata("completed_shots", serde_json::json!(report.completed))
    }

    fn finish(jobs: &JobTable, job_id: &str, outcome: SimResult<ShotReport>, elapsed_ms: u64) {
        let mut jobs = lock(jobs);
        let Some(sim_job) = jobs.get_mut(job_id) else {
            return;
        };
        match outcome {
            Ok(report) => {
                let status = if report.is_partial() {
                    JobStatus::Cancelled
                } else {
                    JobStatus::Completed
                };
                debug!(job_id, completed = report.completed, %status, "job finished");
                sim_job.result = Some(Self::build_result(report, elapsed_ms));
                sim_job.set_status(status);
            }
            Err(err) => {
                warn!(job_id, error = %err, "job failed");
                sim_job.set_status(JobStatus::Failed(err.to_string()));
            }
        }
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        let pending = lock(&self.jobs)
            .values()
            .filter(|j| j.job.status.is_pending())
            .count();
        Ok(BackendAvailability::with_queue(pending as u32))
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let mut reasons = vec![];
        if let Err(err) = self.sim_config.check_circuit(circuit) {
            reasons.push(err.to_string());
        }
        for inst in circuit.instructions() {
            if let Some(gate) = inst.as_gate() {
                if !self.capabilities.gate_set.supports(&gate.kind) {
                    reasons.push(format!("unsupported gate '{}'", gate.name()));
                }
            }
        }
        if let Err(err) = check_classical_flow(circuit) {
            reasons.push(err.to_string());
        }

        Ok(if reasons.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid { reasons }
        })
    }

    #[instrument(skip(self, circuit))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if shots == 0 || shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} shots requested, simulator accepts 1..={}",
                self.capabilities.max_shots
            )));
        }
        self.sim_config.check_circuit(circuit)?;
        check_classical_flow(circuit)?;

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let cancel = CancelToken::new();
        let (status_tx, _) = watch::channel(JobStatus::Queued);
        lock(&self.jobs).insert(
            job_id.as_str().to_owned(),
            SimJob {
                job: Job::new(job_id.clone(), shots).with_backend(self.name()),
                cancel: cancel.clone(),
                result: None,
                status_tx,
            },
        );
        debug!(%job_id, shots, "job queued");

        let jobs = Arc::clone(&self.jobs);
        let circuit = circuit.clone();
        let config = self.sim_config.clone();
        let seed = self.seed;
        let id = job_id.as_str().to_owned();
        tokio::task::spawn_blocking(move || {
            if let Some(sim_job) = lock(&jobs).get_mut(&id) {
                sim_job.set_status(JobStatus::Running);
            }
            let start = Instant::now();
            let outcome = run_shots_with(&circuit, u64::from(shots), seed, &config, &cancel);
            Self::finish(&jobs, &id, outcome, start.elapsed().as_millis() as u64);
        });

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        lock(&self.jobs)
            .get(job_id.as_str())
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.to_string()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let jobs = lock(&self.jobs);
        let sim_job = jobs
            .get(job_id.as_str())
            .ok_or_else(|| HalError::JobNotFound(job_id.to_string()))?;
        match (&sim_job.result, &sim_job.job.status) {
            (Some(result), _) => Ok(result.clone()),
            (None, JobStatus::Failed(msg)) => Err(HalError::JobFailed(msg.clone())),
            (None, _) => Err(HalError::ResultNotReady(job_id.to_string())),
        }
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let jobs = lock(&self.jobs);
        let sim_job = jobs
            .get(job_id.as_str())
            .ok_or_else(|| HalError::JobNotFound(job_id.to_string()))?;
        if !sim_job.job.status.is_terminal() {
            debug!(%job_id, "cancelling job");
            sim_job.cancel.cancel();
        }
        Ok(())
    }

    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let mut rx = lock(&self.jobs)
            .get(job_id.as_str())
            .map(|j| j.status_tx.subscribe())
            .ok_or_else(|| HalError::JobNotFound(job_id.to_string()))?;

        let status = rx
            .wait_for(JobStatus::is_terminal)
            .await
            .map_err(|_| HalError::JobNotFound(job_id.to_string()))?
            .clone();
        match status {
            JobStatus::Completed => self.result(job_id).await,
            JobStatus::Failed(msg) => Err(HalError::JobFailed(msg)),
            _ => Err(HalError::JobCancelled),
        }
    }
}

impl BackendFactory for SimulatorBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let sim_config = SimulatorConfig::from_backend_config(&config)?;
        let seed = config.get_u64("seed")?;

        Ok(Self::assemble(config, sim_config, seed))
    }
}
