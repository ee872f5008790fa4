//! Confirmation polling
//!
//! Polls a target chain for the confirmation depth of a submitted
//! transaction. The loop is budgeted: a job that never reaches its required
//! depth within the configured tick count is timed out, so no job polls
//! forever.

use std::time::Duration;

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::MonitorConfig;
use crate::evm_client::{EvmClient, TxStatus};
use crate::storage::{JobObserver, JobStatus, JobUpdate};

/// Polls the target chain until the transaction is confirmed, fails, or the
/// poll budget is exhausted.
///
/// Each tick reads the transaction state and reports it through `observer`:
/// - included at or above the required depth: terminal `confirmed`
/// - included below the required depth: the new confirmation count
/// - reverted: terminal `failed`, distinguished from submission failure
/// - not found: nothing reported; the transaction may not be indexed yet
///
/// RPC errors count against the tick budget and do not end the job early.
/// Exhausting the budget reports the terminal `timeout` status.
///
/// # Arguments
///
/// * `client` - JSON-RPC client for the target chain
/// * `job_id` - Job the transaction belongs to
/// * `tx_hash` - Transaction to watch
/// * `required_confirmations` - Depth at which the job is confirmed
/// * `config` - Poll interval and tick budget
/// * `observer` - Progress sink; a `false` return stops polling
///
/// # Returns
///
/// The terminal status the job reached, or `None` when the job stopped
/// accepting updates (cancelled while polling).
pub async fn poll_confirmations(
    client: &EvmClient,
    job_id: Uuid,
    tx_hash: &str,
    required_confirmations: u64,
    config: &MonitorConfig,
    observer: &dyn JobObserver,
) -> Option<JobStatus> {
    let interval = Duration::from_millis(config.poll_interval_ms);

    for tick in 1..=config.max_poll_ticks {
        tokio::time::sleep(interval).await;

        match client.transaction_status(tx_hash).await {
            Ok(TxStatus::Included { confirmations }) => {
                if confirmations >= required_confirmations {
                    info!(
                        "Job {} confirmed: tx {} has {} confirmations (required {})",
                        job_id, tx_hash, confirmations, required_confirmations
                    );
                    if !observer
                        .record(job_id, JobUpdate::confirmed(confirmations))
                        .await
                    {
                        return None;
                    }
                    return Some(JobStatus::Confirmed);
                }

                debug!(
                    "Job {}: tx {} at {}/{} confirmations (tick {}/{})",
                    job_id, tx_hash, confirmations, required_confirmations, tick, config.max_poll_ticks
                );
                if !observer
                    .record(job_id, JobUpdate::confirmations(confirmations))
                    .await
                {
                    return None;
                }
            }
            Ok(TxStatus::Reverted) => {
                info!("Job {} failed: tx {} reverted on chain", job_id, tx_hash);
                if !observer
                    .record(job_id, JobUpdate::failed("transaction reverted on target chain"))
                    .await
                {
                    return None;
                }
                return Some(JobStatus::Failed);
            }
            Ok(TxStatus::NotFound) => {
                debug!(
                    "Job {}: tx {} not yet indexed (tick {}/{})",
                    job_id, tx_hash, tick, config.max_poll_ticks
                );
            }
            Err(e) => {
                error!("Confirmation poll for job {} failed: {}", job_id, e);
            }
        }
    }

    info!(
        "Job {} timed out: tx {} not confirmed within {} polls",
        job_id, tx_hash, config.max_poll_ticks
    );
    let update = JobUpdate {
        status: Some(JobStatus::Timeout),
        last_error: Some(format!(
            "no confirmation within {} polls",
            config.max_poll_ticks
        )),
        ..JobUpdate::default()
    };
    if !observer.record(job_id, update).await {
        return None;
    }
    Some(JobStatus::Timeout)
}
