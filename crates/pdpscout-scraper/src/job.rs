//! In-memory registry of background batch jobs.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use pdpscout_core::StoreTarget;
use serde::Serialize;
use uuid::Uuid;

use crate::batch::{validate_batch_stores, BatchError, BatchProgress, ResolutionEngine};
use crate::table::ResultTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Finished,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobProgress {
    pub done: usize,
    pub total: usize,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Why a failed job stopped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobTicket {
    pub job_id: Uuid,
    pub total: usize,
}

#[derive(Debug)]
struct JobEntry {
    progress: JobProgress,
    result: Option<Arc<ResultTable>>,
}

/// How long a finished job stays queryable by default.
pub const DEFAULT_JOB_RETENTION: Duration = Duration::from_secs(60 * 60);

/// Tracks batches running in the background. Cloning shares the registry.
///
/// Finished jobs are dropped once they are older than the retention period;
/// the sweep runs whenever a new job starts.
#[derive(Debug, Clone)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<Uuid, JobEntry>>>,
    retention: Duration,
}

impl JobRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_JOB_RETENTION)
    }

    #[must_use]
    pub fn with_retention(retention: Duration) -> Self {
        Self {
            jobs: Arc::default(),
            retention,
        }
    }

    /// Validate the store set and start the batch on the Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError`] without registering a job when the store set is
    /// unusable.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(
        &self,
        engine: Arc<ResolutionEngine>,
        identifiers: Vec<String>,
        stores: Vec<StoreTarget>,
    ) -> Result<JobTicket, BatchError> {
        validate_batch_stores(&stores)?;
        self.evict_expired();

        let job_id = Uuid::new_v4();
        let total = identifiers.len();
        self.write().insert(
            job_id,
            JobEntry {
                progress: JobProgress {
                    done: 0,
                    total,
                    status: JobStatus::Running,
                    started_at: Utc::now(),
                    finished_at: None,
                    error: None,
                },
                result: None,
            },
        );
        tracing::info!(%job_id, total, stores = stores.len(), "job started");

        let registry = self.clone();
        tokio::spawn(async move {
            let progress_registry = registry.clone();
            let outcome = engine
                .resolve_batch_with_progress(&identifiers, &stores, move |progress| {
                    progress_registry.record_progress(job_id, progress);
                })
                .await;
            registry.complete(job_id, outcome);
        });

        Ok(JobTicket { job_id, total })
    }

    #[must_use]
    pub fn progress(&self, job_id: Uuid) -> Option<JobProgress> {
        self.read().get(&job_id).map(|entry| entry.progress.clone())
    }

    /// The result table, once the job has finished.
    #[must_use]
    pub fn result(&self, job_id: Uuid) -> Option<Arc<ResultTable>> {
        self.read()
            .get(&job_id)
            .and_then(|entry| entry.result.clone())
    }

    fn record_progress(&self, job_id: Uuid, progress: BatchProgress) {
        if let Some(entry) = self.write().get_mut(&job_id) {
            entry.progress.done = progress.done;
            entry.progress.total = progress.total;
        }
    }

    fn complete(&self, job_id: Uuid, outcome: Result<ResultTable, BatchError>) {
        let mut jobs = self.write();
        let Some(entry) = jobs.get_mut(&job_id) else {
            return;
        };
        entry.progress.finished_at = Some(Utc::now());
        match outcome {
            Ok(table) => {
                entry.progress.done = entry.progress.total;
                entry.progress.status = JobStatus::Finished;
                entry.result = Some(Arc::new(table));
                tracing::info!(%job_id, "job finished");
            }
            Err(error) => {
                entry.progress.status = JobStatus::Failed;
                entry.progress.error = Some(error.to_string());
                tracing::error!(%job_id, error = %error, "job failed");
            }
        }
    }

    /// Drop finished or failed jobs older than the retention period. Running
    /// jobs are never evicted.
    fn evict_expired(&self) {
        let now = Utc::now();
        let retention = self.retention;
        let mut jobs = self.write();
        let before = jobs.len();
        jobs.retain(|_, entry| {
            entry.progress.finished_at.is_none_or(|finished| {
                (now - finished)
                    .to_std()
                    .is_ok_and(|age| age < retention)
            })
        });
        let evicted = before - jobs.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = jobs.len(), "evicted expired jobs");
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, JobEntry>> {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, JobEntry>> {
        self.jobs.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}
