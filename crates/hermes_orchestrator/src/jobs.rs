use std::{collections::VecDeque, sync::Arc};

use fxhash::FxHashMap;
use jiff::Timestamp;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

pub type JobId = String;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Working,
    Completed,
    Failed,
    Killed,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct JobStatus {
    pub created_at: Timestamp,
    pub id: JobId,
    pub state: JobState,
    /// Progress or failure message reported by the worker
    pub message: Option<String>,
    pub checksum: Option<String>,
}

/// What a worker needs to run a queued solve, `batch` is the serialized list of sub-problems
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct JobPayload {
    pub api_key: String,
    pub checksum: Option<String>,
    pub batch: String,
}

#[derive(Debug, Error)]
pub enum JobQueueError {
    #[error("Unknown job {0}")]
    UnknownJob(JobId),

    #[error("Job queue failure: {0}")]
    Failure(String),
}

pub trait JobQueue: Send + Sync {
    fn enqueue(&self, queue: &str, payload: JobPayload) -> Result<JobId, JobQueueError>;
    /// Withdraws a job that no worker picked up yet
    fn dequeue(&self, job_id: &str) -> Result<(), JobQueueError>;
    fn status(&self, job_id: &str) -> Option<JobStatus>;
    /// Requests cooperative cancellation
    fn cancel(&self, job_id: &str) -> Result<(), JobQueueError>;
    fn remove_status(&self, job_id: &str);
}

/// Job ids submitted by each api key
pub trait ResultCache: Send + Sync {
    fn get(&self, api_key: &str) -> Vec<JobId>;
    fn add(&self, api_key: &str, job_id: &str);
    fn remove(&self, api_key: &str, job_id: &str);
}

pub struct JobManager {
    queue: Arc<dyn JobQueue>,
    cache: Arc<dyn ResultCache>,
}

impl JobManager {
    pub fn new(queue: Arc<dyn JobQueue>, cache: Arc<dyn ResultCache>) -> Self {
        JobManager { queue, cache }
    }

    /// Live jobs of `api_key`, ids the queue no longer knows are dropped from the cache
    pub fn list(&self, api_key: &str) -> Vec<JobStatus> {
        let mut statuses = Vec::new();
        for job_id in self.cache.get(api_key) {
            match self.queue.status(&job_id) {
                Some(status) => statuses.push(status),
                None => {
                    debug!(%job_id, "Dropping expired job from cache");
                    self.cache.remove(api_key, &job_id);
                }
            }
        }
        statuses
    }

    pub fn kill(&self, job_id: &str) -> Result<(), JobQueueError> {
        info!(job_id, "Killing job");
        self.queue.cancel(job_id)
    }

    /// Forgets the job for `api_key`, a job still waiting in its queue is purged
    pub fn remove(&self, api_key: &str, job_id: &str) -> Result<(), JobQueueError> {
        self.cache.remove(api_key, job_id);

        if self
            .queue
            .status(job_id)
            .is_some_and(|status| status.state == JobState::Queued)
        {
            self.queue.dequeue(job_id)?;
            self.queue.remove_status(job_id);
            info!(job_id, "Queued job purged");
        }

        Ok(())
    }
}

struct QueuedJob {
    queue: String,
    payload: JobPayload,
    status: JobStatus,
}

#[derive(Default)]
struct QueueState {
    jobs: FxHashMap<JobId, QueuedJob>,
    pending: VecDeque<JobId>,
}

/// Process local queue for embedding and tests
#[derive(Default)]
pub struct InMemoryJobQueue {
    state: RwLock<QueueState>,
}

impl InMemoryJobQueue {
    pub fn set_status(
        &self,
        job_id: &str,
        state: JobState,
        message: Option<String>,
    ) -> Result<(), JobQueueError> {
        let mut guard = self.state.write();
        let job = guard
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| JobQueueError::UnknownJob(job_id.to_owned()))?;
        job.status.state = state;
        job.status.message = message;
        Ok(())
    }

    /// Hands the oldest pending job of `queue` to a worker
    pub fn take_next(&self, queue: &str) -> Option<(JobId, JobPayload)> {
        let mut guard = self.state.write();
        let QueueState { jobs, pending } = &mut *guard;

        let position = pending
            .iter()
            .position(|job_id| jobs.get(job_id).is_some_and(|job| job.queue == queue))?;
        let job_id = pending.remove(position)?;
        let job = jobs.get_mut(&job_id)?;
        job.status.state = JobState::Working;

        Some((job_id, job.payload.clone()))
    }
}

impl JobQueue for InMemoryJobQueue {
    fn enqueue(&self, queue: &str, payload: JobPayload) -> Result<JobId, JobQueueError> {
        let job_id = Uuid::new_v4().to_string();
        let status = JobStatus {
            created_at: Timestamp::now(),
            id: job_id.clone(),
            state: JobState::Queued,
            message: None,
            checksum: payload.checksum.clone(),
        };

        let mut guard = self.state.write();
        guard.jobs.insert(
            job_id.clone(),
            QueuedJob {
                queue: queue.to_owned(),
                payload,
                status,
            },
        );
        guard.pending.push_back(job_id.clone());

        Ok(job_id)
    }

    fn dequeue(&self, job_id: &str) -> Result<(), JobQueueError> {
        let mut guard = self.state.write();
        let position = guard
            .pending
            .iter()
            .position(|pending| pending == job_id)
            .ok_or_else(|| JobQueueError::UnknownJob(job_id.to_owned()))?;
        guard.pending.remove(position);
        Ok(())
    }

    fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.state
            .read()
            .jobs
            .get(job_id)
            .map(|job| job.status.clone())
    }

    fn cancel(&self, job_id: &str) -> Result<(), JobQueueError> {
        let mut guard = self.state.write();
        let job = guard
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| JobQueueError::UnknownJob(job_id.to_owned()))?;

        let was_queued = job.status.state == JobState::Queued;
        if matches!(job.status.state, JobState::Queued | JobState::Working) {
            job.status.state = JobState::Killed;
        }
        if was_queued {
            guard.pending.retain(|pending| pending != job_id);
        }

        Ok(())
    }

    fn remove_status(&self, job_id: &str) {
        self.state.write().jobs.remove(job_id);
    }
}

#[derive(Default)]
pub struct InMemoryResultCache {
    entries: RwLock<FxHashMap<String, Vec<JobId>>>,
}

impl ResultCache for InMemoryResultCache {
    fn get(&self, api_key: &str) -> Vec<JobId> {
        self.entries.read().get(api_key).cloned().unwrap_or_default()
    }

    fn add(&self, api_key: &str, job_id: &str) {
        self.entries
            .write()
            .entry(api_key.to_owned())
            .or_default()
            .push(job_id.to_owned());
    }

    fn remove(&self, api_key: &str, job_id: &str) {
        if let Some(job_ids) = self.entries.write().get_mut(api_key) {
            job_ids.retain(|id| id != job_id);
        }
    }
}
