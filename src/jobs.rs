//! Background jobs
//!
//! Admin requests never run population inline. They submit a job and get
//! its record back; a single worker drains the queue and runs one job at a
//! time, so two population runs never overlap.
//!
//! ```text
//! POST /api/admin/...  →  JobQueue::submit  →  [mpsc]  →  worker_loop
//!                              ↓                              ↓
//!                        JobRecord (queued)        running → completed/failed
//! ```
//!
//! A kind that is already queued or running is not enqueued twice; the
//! existing record is returned with `deduplicated: true`.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Finished records kept for `GET /api/admin/jobs`
const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    PopulateAll,
    SyncData,
    ResetDatabase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PopulateAll => "populate_all",
            Self::SyncData => "sync_data",
            Self::ResetDatabase => "reset_database",
        }
    }
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: Uuid,
    pub kind: JobKind,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub job: JobRecord,
    pub deduplicated: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Job queue is full")]
    QueueFull,
    #[error("Job worker has stopped")]
    Closed,
}

pub type JobFuture = Pin<Box<dyn Future<Output = anyhow::Result<serde_json::Value>> + Send>>;

/// Turns a job kind into the work it performs
pub type JobRunner = Arc<dyn Fn(JobKind) -> JobFuture + Send + Sync>;

#[derive(Default)]
struct JobTable {
    records: HashMap<Uuid, JobRecord>,
    /// Newest last
    order: VecDeque<Uuid>,
}

impl JobTable {
    fn active(&self, kind: JobKind) -> Option<&JobRecord> {
        self.records.values().find(|r| r.kind == kind && r.status.is_active())
    }

    fn insert(&mut self, record: JobRecord) {
        self.order.push_back(record.id);
        self.records.insert(record.id, record);

        // Evict the oldest finished records past the limit
        while self.order.len() > HISTORY_LIMIT {
            let Some(pos) = self
                .order
                .iter()
                .position(|id| self.records.get(id).is_some_and(|r| !r.status.is_active()))
            else {
                break;
            };
            if let Some(id) = self.order.remove(pos) {
                self.records.remove(&id);
            }
        }
    }

    fn update(&mut self, id: Uuid, f: impl FnOnce(&mut JobRecord)) {
        if let Some(record) = self.records.get_mut(&id) {
            f(record);
        }
    }
}

/// Internal queue entry
struct QueuedJob {
    id: Uuid,
    kind: JobKind,
}

#[derive(Clone)]
pub struct JobQueue {
    table: Arc<Mutex<JobTable>>,
    request_tx: mpsc::Sender<QueuedJob>,
}

impl JobQueue {
    /// Spawn the worker; must be called inside a tokio runtime
    pub fn start(runner: JobRunner, capacity: usize) -> Self {
        let table = Arc::new(Mutex::new(JobTable::default()));
        let (request_tx, request_rx) = mpsc::channel(capacity.max(1));

        let worker_table = table.clone();
        tokio::spawn(async move {
            Self::worker_loop(request_rx, worker_table, runner).await;
        });

        info!("JobQueue started (capacity {})", capacity.max(1));
        Self { table, request_tx }
    }

    pub fn submit(&self, kind: JobKind) -> Result<Submission, JobError> {
        let mut table = self.table.lock();
        if let Some(existing) = table.active(kind) {
            info!("Job {:?} already {:?}, returning {}", kind, existing.status, existing.id);
            return Ok(Submission {
                job: existing.clone(),
                deduplicated: true,
            });
        }

        let record = JobRecord {
            id: Uuid::new_v4(),
            kind,
            status: JobStatus::Queued,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            result: None,
            error: None,
        };

        self.request_tx
            .try_send(QueuedJob { id: record.id, kind })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => JobError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => JobError::Closed,
            })?;

        info!("Job {} queued: {:?}", record.id, kind);
        table.insert(record.clone());
        Ok(Submission {
            job: record,
            deduplicated: false,
        })
    }

    pub fn get(&self, id: Uuid) -> Option<JobRecord> {
        self.table.lock().records.get(&id).cloned()
    }

    /// Newest first
    pub fn list(&self) -> Vec<JobRecord> {
        let table = self.table.lock();
        table.order.iter().rev().filter_map(|id| table.records.get(id).cloned()).collect()
    }

    pub fn active(&self, kind: JobKind) -> Option<JobRecord> {
        self.table.lock().active(kind).cloned()
    }

    /// Runs jobs one at a time. Each job runs in its own task so a panic
    /// marks the job failed instead of killing the worker.
    async fn worker_loop(mut request_rx: mpsc::Receiver<QueuedJob>, table: Arc<Mutex<JobTable>>, runner: JobRunner) {
        while let Some(job) = request_rx.recv().await {
            table.lock().update(job.id, |r| {
                r.status = JobStatus::Running;
                r.started_at = Some(Utc::now());
            });
            info!("Job {} running: {:?}", job.id, job.kind);

            let outcome = tokio::spawn(runner(job.kind)).await;

            let finished_at = Some(Utc::now());
            match outcome {
                Ok(Ok(result)) => {
                    info!("Job {} completed", job.id);
                    table.lock().update(job.id, |r| {
                        r.status = JobStatus::Completed;
                        r.finished_at = finished_at;
                        r.result = Some(result);
                    });
                }
                Ok(Err(e)) => {
                    error!("Job {} failed: {:#}", job.id, e);
                    table.lock().update(job.id, |r| {
                        r.status = JobStatus::Failed;
                        r.finished_at = finished_at;
                        r.error = Some(format!("{:#}", e));
                    });
                }
                Err(join_err) => {
                    error!("Job {} panicked: {}", job.id, join_err);
                    table.lock().update(job.id, |r| {
                        r.status = JobStatus::Failed;
                        r.finished_at = finished_at;
                        r.error = Some(format!("Job aborted: {}", join_err));
                    });
                }
            }
        }
        warn!("Job queue closed, worker exiting");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    async fn wait_for(queue: &JobQueue, id: Uuid, status: JobStatus) -> JobRecord {
        for _ in 0..200 {
            if let Some(record) = queue.get(id) {
                if record.status == status {
                    return record;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job {} never reached {:?}", id, status);
    }

    #[tokio::test]
    async fn test_job_completes_with_result() {
        let runner: JobRunner =
            Arc::new(|kind| -> JobFuture { Box::pin(async move { Ok::<_, anyhow::Error>(serde_json::json!({ "kind": kind })) }) });
        let queue = JobQueue::start(runner, 4);

        let submission = queue.submit(JobKind::SyncData).unwrap();
        assert!(!submission.deduplicated);
        assert_eq!(submission.job.status, JobStatus::Queued);

        let done = wait_for(&queue, submission.job.id, JobStatus::Completed).await;
        assert_eq!(done.result, Some(serde_json::json!({ "kind": "sync_data" })));
        assert!(done.started_at.is_some() && done.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_failed_job_records_error() {
        let runner: JobRunner = Arc::new(|_| -> JobFuture { Box::pin(async { Err::<serde_json::Value, _>(anyhow::anyhow!("wiki unreachable")) }) });
        let queue = JobQueue::start(runner, 4);

        let id = queue.submit(JobKind::PopulateAll).unwrap().job.id;
        let failed = wait_for(&queue, id, JobStatus::Failed).await;
        assert_eq!(failed.error.as_deref(), Some("wiki unreachable"));
    }

    #[tokio::test]
    async fn test_duplicate_kind_is_coalesced() {
        let gate = Arc::new(Notify::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let runner: JobRunner = {
            let gate = gate.clone();
            let runs = runs.clone();
            Arc::new(move |_| -> JobFuture {
                let gate = gate.clone();
                let runs = runs.clone();
                Box::pin(async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    gate.notified().await;
                    Ok::<_, anyhow::Error>(serde_json::Value::Null)
                })
            })
        };
        let queue = JobQueue::start(runner, 4);

        let first = queue.submit(JobKind::PopulateAll).unwrap();
        let second = queue.submit(JobKind::PopulateAll).unwrap();
        assert!(second.deduplicated);
        assert_eq!(first.job.id, second.job.id);

        let other = queue.submit(JobKind::SyncData).unwrap();
        assert!(!other.deduplicated);

        wait_for(&queue, first.job.id, JobStatus::Running).await;
        gate.notify_one();
        wait_for(&queue, first.job.id, JobStatus::Completed).await;
        wait_for(&queue, other.job.id, JobStatus::Running).await;
        gate.notify_one();
        wait_for(&queue, other.job.id, JobStatus::Completed).await;

        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(queue.list().len(), 2);
        assert_eq!(queue.list()[0].id, other.job.id);
    }

    #[tokio::test]
    async fn test_panicking_job_does_not_stop_worker() {
        let runner: JobRunner = Arc::new(|kind| -> JobFuture {
            Box::pin(async move {
                if kind == JobKind::ResetDatabase {
                    panic!("boom");
                }
                Ok::<_, anyhow::Error>(serde_json::Value::Bool(true))
            })
        });
        let queue = JobQueue::start(runner, 4);

        let bad = queue.submit(JobKind::ResetDatabase).unwrap().job.id;
        wait_for(&queue, bad, JobStatus::Failed).await;

        let good = queue.submit(JobKind::SyncData).unwrap().job.id;
        wait_for(&queue, good, JobStatus::Completed).await;
    }
}
