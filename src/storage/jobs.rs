//! Bridge job table
//!
//! A bridge job is one relay attempt of a receipt to one target chain. Jobs
//! are created by the route layer, advanced by the relay and monitor tasks,
//! and never deleted. The single write path is [`BridgeJobStore::apply`],
//! which enforces the job invariants regardless of who the writer is:
//! terminal states are frozen, attempt counts stay within the configured
//! bound, and confirmation counts only grow.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::TargetChain;
use crate::storage::receipts::Receipt;

// ============================================================================
// JOB STATUS
// ============================================================================

/// Lifecycle state of a bridge job.
///
/// Transitions: `pending → submitting → (pending-confirmation | failed)`,
/// `pending-confirmation → (confirmed | failed | timeout)`. Any non-terminal
/// state can move to `cancelled`. Confirmed, failed, timeout, and cancelled
/// are terminal: no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Pending,
    Submitting,
    PendingConfirmation,
    Confirmed,
    Failed,
    Timeout,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Confirmed | JobStatus::Failed | JobStatus::Timeout | JobStatus::Cancelled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Pending => "pending",
            JobStatus::Submitting => "submitting",
            JobStatus::PendingConfirmation => "pending-confirmation",
            JobStatus::Confirmed => "confirmed",
            JobStatus::Failed => "failed",
            JobStatus::Timeout => "timeout",
            JobStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

// ============================================================================
// BRIDGE JOB
// ============================================================================

/// One relay of a receipt to one target chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeJob {
    /// Unique identifier for the job
    pub id: Uuid,
    /// Receipt this job relays
    pub receipt_id: Uuid,
    /// Content hash of the relayed document, denormalized for status lookups
    pub doc_hash: String,
    /// Chain the receipt is anchored on
    pub source_chain: String,
    /// Chain the proof is relayed to
    pub target_chain: TargetChain,
    /// Current lifecycle state
    pub status: JobStatus,
    /// Confirmation depth observed so far
    pub confirmations: u64,
    /// Confirmation depth at which the job counts as confirmed
    pub required_confirmations: u64,
    /// Submission attempts performed so far
    pub attempts: u32,
    /// Maximum submission attempts before the job fails
    pub max_attempts: u32,
    /// Transaction hash on the target chain, set once submission succeeds
    pub tx_hash: Option<String>,
    /// Message of the most recent submission or confirmation failure
    pub last_error: Option<String>,
    /// Caller-supplied metadata from the relay request
    pub metadata: Option<serde_json::Value>,
    /// Timestamp when the job was created
    pub created_at: DateTime<Utc>,
    /// Timestamp of the terminal transition, set exactly once
    pub completed_at: Option<DateTime<Utc>>,
}

impl BridgeJob {
    /// Creates a fresh job for relaying `receipt` to `target_chain`.
    pub fn new(
        receipt: &Receipt,
        source_chain: &str,
        target_chain: TargetChain,
        required_confirmations: u64,
        max_attempts: u32,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            receipt_id: receipt.id,
            doc_hash: receipt.content_hash.clone(),
            source_chain: source_chain.to_string(),
            target_chain,
            status: JobStatus::Pending,
            confirmations: 0,
            required_confirmations,
            attempts: 0,
            max_attempts,
            tx_hash: None,
            last_error: None,
            metadata,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

// ============================================================================
// JOB UPDATES
// ============================================================================

/// Partial update applied to a job. Unset fields leave the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub attempts: Option<u32>,
    pub tx_hash: Option<String>,
    pub confirmations: Option<u64>,
    pub last_error: Option<String>,
}

impl JobUpdate {
    /// Update carrying only a status transition.
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Update recording a successful submission: the job moves to
    /// pending-confirmation with its transaction hash.
    pub fn submitted(attempt: u32, tx_hash: &str) -> Self {
        Self {
            status: Some(JobStatus::PendingConfirmation),
            attempts: Some(attempt),
            tx_hash: Some(tx_hash.to_string()),
            ..Self::default()
        }
    }

    /// Update recording a failed submission attempt with retries remaining:
    /// the job returns to pending until the next attempt.
    pub fn attempt_failed(attempt: u32, error: &str) -> Self {
        Self {
            status: Some(JobStatus::Pending),
            attempts: Some(attempt),
            last_error: Some(error.to_string()),
            ..Self::default()
        }
    }

    /// Update recording a terminal failure.
    pub fn failed(error: &str) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            last_error: Some(error.to_string()),
            ..Self::default()
        }
    }

    /// Update carrying a new confirmation count.
    pub fn confirmations(confirmations: u64) -> Self {
        Self {
            confirmations: Some(confirmations),
            ..Self::default()
        }
    }

    /// Update recording the confirmed terminal state.
    pub fn confirmed(confirmations: u64) -> Self {
        Self {
            status: Some(JobStatus::Confirmed),
            confirmations: Some(confirmations),
            ..Self::default()
        }
    }
}

// ============================================================================
// STORE ERRORS
// ============================================================================

/// Errors from the job store write paths.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum JobStoreError {
    #[error("bridge job {0} not found")]
    NotFound(Uuid),
    /// The job already reached a terminal status; terminal jobs are frozen.
    #[error("bridge job {id} is already {status}")]
    Terminal { id: Uuid, status: JobStatus },
}

// ============================================================================
// JOB OBSERVER
// ============================================================================

/// Progress sink for relay and monitor tasks.
///
/// The relay service and the confirmation monitor do not own persistence;
/// they report each attempt and poll result through this trait. The job
/// store implements it by applying the update; tests implement it by
/// recording updates.
#[async_trait]
pub trait JobObserver: Send + Sync {
    /// Applies a progress update for the given job. Returns `false` when the
    /// job can no longer accept updates (already terminal), which tells the
    /// reporting task to stop its work for that job.
    async fn record(&self, job_id: Uuid, update: JobUpdate) -> bool;
}

// ============================================================================
// BRIDGE JOB STORE
// ============================================================================

/// In-memory bridge job table.
///
/// Each job has exactly one pipeline task writing to it; `apply` still
/// revalidates every update under the write lock so a racing manual
/// cancellation cannot produce a lost update or thaw a terminal job.
#[derive(Default)]
pub struct BridgeJobStore {
    jobs: RwLock<HashMap<Uuid, BridgeJob>>,
}

impl BridgeJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a freshly created job.
    pub async fn insert(&self, job: BridgeJob) {
        self.jobs.write().await.insert(job.id, job);
    }

    /// Returns the job with the given id, if present.
    pub async fn get(&self, id: &Uuid) -> Option<BridgeJob> {
        self.jobs.read().await.get(id).cloned()
    }

    /// Returns all jobs relaying the given document hash, oldest first.
    pub async fn jobs_for_doc_hash(&self, doc_hash: &str) -> Vec<BridgeJob> {
        let mut jobs: Vec<BridgeJob> = self
            .jobs
            .read()
            .await
            .values()
            .filter(|job| job.doc_hash == doc_hash)
            .cloned()
            .collect();
        jobs.sort_by_key(|job| job.created_at);
        jobs
    }

    /// Applies a partial update to a job under the write lock.
    ///
    /// Invariants enforced here, independent of the caller:
    /// - a terminal job is never mutated again
    /// - `attempts` never exceeds `max_attempts`
    /// - `confirmations` never decreases, and never exceeds
    ///   `required_confirmations` while the job is non-terminal
    /// - `completed_at` is stamped on the transition into a terminal status
    ///
    /// # Returns
    ///
    /// * `Ok(BridgeJob)` - The job after the update
    /// * `Err(JobStoreError)` - Unknown job id, or the job is terminal
    pub async fn apply(&self, id: &Uuid, update: JobUpdate) -> Result<BridgeJob, JobStoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(id).ok_or(JobStoreError::NotFound(*id))?;

        if job.status.is_terminal() {
            return Err(JobStoreError::Terminal {
                id: *id,
                status: job.status,
            });
        }

        let next_status = update.status.unwrap_or(job.status);

        if let Some(attempts) = update.attempts {
            job.attempts = attempts.min(job.max_attempts);
        }
        if let Some(tx_hash) = update.tx_hash {
            job.tx_hash = Some(tx_hash);
        }
        if let Some(confirmations) = update.confirmations {
            let mut confirmations = confirmations.max(job.confirmations);
            if !next_status.is_terminal() {
                confirmations = confirmations.min(job.required_confirmations);
            }
            job.confirmations = confirmations;
        }
        if let Some(last_error) = update.last_error {
            job.last_error = Some(last_error);
        }

        job.status = next_status;
        if next_status.is_terminal() && job.completed_at.is_none() {
            job.completed_at = Some(Utc::now());
        }

        Ok(job.clone())
    }

    /// Marks a job cancelled if it has not already reached a terminal state.
    ///
    /// The pipeline task for the job observes the terminal status at its
    /// next store interaction and stops.
    pub async fn cancel(&self, id: &Uuid) -> Result<BridgeJob, JobStoreError> {
        self.apply(id, JobUpdate::status(JobStatus::Cancelled)).await
    }
}

#[async_trait]
impl JobObserver for BridgeJobStore {
    async fn record(&self, job_id: Uuid, update: JobUpdate) -> bool {
        match self.apply(&job_id, update).await {
            Ok(_) => true,
            Err(JobStoreError::Terminal { status, .. }) => {
                debug!("Dropping update for job {}: already {}", job_id, status);
                false
            }
            Err(JobStoreError::NotFound(_)) => {
                warn!("Dropping update for unknown job {}", job_id);
                false
            }
        }
    }
}
