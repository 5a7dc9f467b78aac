//! Asynchronous job handles for sampling requests.
//!
//! The job state machine:
//!
//! ```text
//!   submit ──→ Pending ──→ Running ──→ Done
//!                             │
//!                             └──→ Failed
//! ```
//!
//! **Invariants:**
//! - Transitions are monotonic; terminal states are permanent.
//! - `result()` blocks until a terminal state and is idempotent: the
//!   first call joins the execution task and caches the outcome, later
//!   calls return the cached value without re-executing.
//! - Every `submit` creates a fresh job with its own id and execution;
//!   resubmitting a payload never re-runs an existing job.
//!
//! No cancellation is defined for in-flight backend work; before
//! execution starts nothing has been dispatched, so there is nothing to
//! cancel.

use std::fmt;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use quasar_hal::RunOptions;

use crate::error::SamplerError;
use crate::postprocess::SamplerRunResult;

/// Unique identifier for a sampler job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    /// Create a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a sampler job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Created, execution not yet started.
    Pending,
    /// Execution dispatched.
    Running,
    /// Completed successfully.
    Done,
    /// Failed; the error is stored on the job.
    Failed,
}

impl JobStatus {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Pending => "Pending",
            JobStatus::Running => "Running",
            JobStatus::Done => "Done",
            JobStatus::Failed => "Failed",
        };
        write!(f, "{name}")
    }
}

/// The work one job references: registry indices, parameter values and
/// run options. Jobs never hold circuit copies.
#[derive(Debug, Clone)]
pub struct JobPayload {
    /// Registry indices, one per requested circuit (duplicates allowed).
    pub indices: Vec<usize>,
    /// Parameter values, one sequence per requested circuit.
    pub parameter_values: Vec<Vec<f64>>,
    /// Options for the backend run.
    pub options: RunOptions,
}

enum JobCell {
    Running(JoinHandle<Result<SamplerRunResult, SamplerError>>),
    Finished(Result<SamplerRunResult, SamplerError>),
}

/// Handle to one asynchronous sampling request.
pub struct SamplerJob {
    id: JobId,
    created_at: DateTime<Utc>,
    status_rx: watch::Receiver<JobStatus>,
    cell: tokio::sync::Mutex<JobCell>,
}

impl SamplerJob {
    /// Spawn the execution future on the tokio runtime and return the
    /// job handle. Execution begins immediately.
    pub(crate) fn spawn<F>(work: F) -> Self
    where
        F: Future<Output = Result<SamplerRunResult, SamplerError>> + Send + 'static,
    {
        let (status_tx, status_rx) = watch::channel(JobStatus::Pending);
        let handle = tokio::spawn(async move {
            let _ = status_tx.send(JobStatus::Running);
            let outcome = work.await;
            let _ = status_tx.send(if outcome.is_ok() {
                JobStatus::Done
            } else {
                JobStatus::Failed
            });
            outcome
        });
        Self {
            id: JobId::new(),
            created_at: Utc::now(),
            status_rx,
            cell: tokio::sync::Mutex::new(JobCell::Running(handle)),
        }
    }

    /// The job's unique id.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// When the job was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Current status snapshot.
    pub fn status(&self) -> JobStatus {
        *self.status_rx.borrow()
    }

    /// Wait for the job to reach a terminal state and return its outcome.
    ///
    /// Idempotent: repeated calls return the same stored result or
    /// error without re-executing.
    pub async fn result(&self) -> Result<SamplerRunResult, SamplerError> {
        let mut cell = self.cell.lock().await;
        match &mut *cell {
            JobCell::Finished(outcome) => outcome.clone(),
            JobCell::Running(handle) => {
                let outcome = match handle.await {
                    Ok(outcome) => outcome,
                    Err(join) => Err(SamplerError::Execution(format!(
                        "job task aborted: {join}"
                    ))),
                };
                *cell = JobCell::Finished(outcome.clone());
                outcome
            }
        }
    }
}

impl fmt::Debug for SamplerJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SamplerJob")
            .field("id", &self.id)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_job_done_and_idempotent() {
        let job = SamplerJob::spawn(async {
            Ok(SamplerRunResult {
                quasi_dists: vec![],
                metadata: vec![],
            })
        });

        let first = job.result().await.unwrap();
        let second = job.result().await.unwrap();
        assert_eq!(first.quasi_dists.len(), second.quasi_dists.len());
        assert_eq!(job.status(), JobStatus::Done);
    }

    #[tokio::test]
    async fn test_job_failure_is_stored() {
        let job = SamplerJob::spawn(async {
            Err(SamplerError::Execution("backend went away".into()))
        });

        let err = job.result().await.unwrap_err();
        assert!(matches!(err, SamplerError::Execution(_)));
        // Same stored error on the second call.
        let err = job.result().await.unwrap_err();
        assert!(matches!(err, SamplerError::Execution(_)));
        assert_eq!(job.status(), JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_fresh_job_per_spawn() {
        let a = SamplerJob::spawn(async {
            Ok(SamplerRunResult {
                quasi_dists: vec![],
                metadata: vec![],
            })
        });
        let b = SamplerJob::spawn(async {
            Ok(SamplerRunResult {
                quasi_dists: vec![],
                metadata: vec![],
            })
        });
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_status_terminal() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Done.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }
}
