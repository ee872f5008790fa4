//! Relay Service Module
//!
//! Submits a receipt's proof to one target chain, retrying transient
//! failures with a growing backoff up to the configured attempt bound. The
//! relay service owns no persistence: every attempt outcome is reported
//! through the [`JobObserver`] passed by the caller.
//!
//! Callers must not run two relays for the same job concurrently; the
//! route layer guarantees this by spawning exactly one pipeline task per
//! job id.

pub mod pipeline;

use std::time::Duration;

use tracing::{error, info};
use uuid::Uuid;

use crate::config::{RelayConfig, TargetChain};
use crate::evm_client::EvmClient;
use crate::storage::{JobObserver, JobStatus, JobUpdate, Receipt};

// ============================================================================
// RELAY REQUEST AND OUTCOME
// ============================================================================

/// Everything the relay service needs to submit one job.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    /// Job the submission belongs to
    pub job_id: Uuid,
    /// Receipt whose proof is relayed
    pub receipt: Receipt,
    /// Chain the proof is submitted to
    pub target_chain: TargetChain,
}

/// Final result of a relay, after retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Submission succeeded; the transaction awaits confirmations
    Submitted { tx_hash: String },
    /// All attempts failed; the job is terminally failed
    Failed,
    /// The job stopped accepting updates mid-relay (cancelled)
    Aborted,
}

// ============================================================================
// SUBMISSION WITH RETRY
// ============================================================================

/// Backoff before retry number `retry` (1-based). Grows linearly with the
/// retry count, so successive delays never shrink.
pub fn backoff_delay(initial_backoff_ms: u64, retry: u32) -> Duration {
    Duration::from_millis(initial_backoff_ms.saturating_mul(u64::from(retry)))
}

/// Attempts to submit a receipt's proof to the target chain, retrying up to
/// the configured bound.
///
/// After every attempt the outcome is reported through `observer` so the
/// caller can persist it: `submitting` before the RPC call, then either
/// `pending-confirmation` with the transaction hash, or the failed attempt
/// count with its error. After the final failed attempt the job is reported
/// `failed` and no further automatic attempts occur.
///
/// # Arguments
///
/// * `client` - JSON-RPC client for the target chain
/// * `request` - Job id, receipt, and target chain
/// * `config` - Retry bound and backoff base
/// * `observer` - Progress sink; a `false` return aborts the relay
pub async fn retry_relay(
    client: &EvmClient,
    request: &RelayRequest,
    config: &RelayConfig,
    observer: &dyn JobObserver,
) -> RelayOutcome {
    let max_attempts = config.max_attempts;

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            tokio::time::sleep(backoff_delay(config.initial_backoff_ms, attempt - 1)).await;
        }

        if !observer
            .record(request.job_id, JobUpdate::status(JobStatus::Submitting))
            .await
        {
            return RelayOutcome::Aborted;
        }

        match client.submit_proof(&request.receipt.proof).await {
            Ok(tx_hash) => {
                info!(
                    "Relayed receipt {} to {} in attempt {}/{}: tx {}",
                    request.receipt.id, request.target_chain, attempt, max_attempts, tx_hash
                );
                if !observer
                    .record(request.job_id, JobUpdate::submitted(attempt, &tx_hash))
                    .await
                {
                    return RelayOutcome::Aborted;
                }
                return RelayOutcome::Submitted { tx_hash };
            }
            Err(e) => {
                error!(
                    "Relay attempt {}/{} for receipt {} to {} failed: {}",
                    attempt, max_attempts, request.receipt.id, request.target_chain, e
                );
                let update = if attempt == max_attempts {
                    JobUpdate {
                        status: Some(JobStatus::Failed),
                        attempts: Some(attempt),
                        last_error: Some(e.to_string()),
                        ..JobUpdate::default()
                    }
                } else {
                    JobUpdate::attempt_failed(attempt, &e.to_string())
                };
                if !observer.record(request.job_id, update).await {
                    return RelayOutcome::Aborted;
                }
            }
        }
    }

    RelayOutcome::Failed
}
