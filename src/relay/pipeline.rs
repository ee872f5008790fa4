//! Per-job relay pipeline
//!
//! One pipeline task per bridge job: submit with retry, then poll for
//! confirmations. The task is the job's single writer; a manual
//! cancellation flips the job terminal in the store and the task observes
//! that at its next progress report and stops.

use std::sync::Arc;

use tracing::{error, info};

use crate::context::RelayerContext;
use crate::monitor;
use crate::relay::{self, RelayOutcome, RelayRequest};
use crate::storage::{BridgeJob, JobObserver, JobUpdate};

/// Spawns the relay-and-monitor pipeline for one job. Fire-and-forget: the
/// caller returns immediately and observes progress via status queries.
pub fn spawn_job_pipeline(ctx: Arc<RelayerContext>, job: BridgeJob) {
    tokio::spawn(async move {
        run_job_pipeline(ctx, job).await;
    });
}

/// Runs the full pipeline for one job: relay with retry, then confirmation
/// polling until a terminal status.
pub async fn run_job_pipeline(ctx: Arc<RelayerContext>, job: BridgeJob) {
    let observer: &dyn JobObserver = ctx.jobs.as_ref();

    let client = match ctx.clients.get(&job.target_chain) {
        Some(client) => client,
        None => {
            // Jobs are only created for configured chains; reaching this
            // means the context and the job table disagree.
            error!("No client for chain {}, failing job {}", job.target_chain, job.id);
            observer
                .record(job.id, JobUpdate::failed("target chain not configured"))
                .await;
            return;
        }
    };

    let receipt = match ctx.receipts.get(&job.receipt_id).await {
        Some(receipt) => receipt,
        None => {
            error!("Receipt {} missing, failing job {}", job.receipt_id, job.id);
            observer
                .record(job.id, JobUpdate::failed("receipt no longer available"))
                .await;
            return;
        }
    };

    let request = RelayRequest {
        job_id: job.id,
        receipt,
        target_chain: job.target_chain,
    };

    match relay::retry_relay(client, &request, &ctx.config.relay, observer).await {
        RelayOutcome::Submitted { tx_hash } => {
            monitor::poll_confirmations(
                client,
                job.id,
                &tx_hash,
                job.required_confirmations,
                &ctx.config.monitor,
                observer,
            )
            .await;
        }
        RelayOutcome::Failed => {
            // Terminal state already recorded by the relay service.
        }
        RelayOutcome::Aborted => {
            info!("Pipeline for job {} stopped before submission completed", job.id);
        }
    }
}
