//! Bridge and receipt route handlers
//!
//! Relay requests are validated synchronously and answered immediately: the
//! handler creates one job per target chain, spawns the relay pipelines,
//! and returns the created jobs without waiting for submission. Progress is
//! observable only through the status endpoints.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use warp::http::StatusCode;

use super::generic::{ApiResponse, ConflictError, NotFoundError, ValidationError};
use crate::config::{self, TargetChain};
use crate::context::RelayerContext;
use crate::monitor;
use crate::relay::pipeline;
use crate::storage::{BridgeJob, JobStoreError, Receipt};

// ============================================================================
// REQUEST/RESPONSE STRUCTURES
// ============================================================================

/// Body of `POST /api/bridge/relay`.
#[derive(Debug, Deserialize)]
pub struct RelayRequestBody {
    /// Receipt to relay
    pub receipt_id: Uuid,
    /// Chains to relay to, by wire name
    pub target_chains: Vec<String>,
    /// Optional caller metadata recorded on every created job
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Body of `POST /api/receipts`.
#[derive(Debug, Deserialize)]
pub struct CreateReceiptBody {
    pub receipt_type: String,
    pub subject_id: String,
    pub content_hash: String,
    pub proof: String,
}

/// Response of `GET /api/receipts/:hash`.
#[derive(Debug, Serialize)]
pub struct ReceiptWithStatus {
    pub receipt: Receipt,
    /// `null` when no bridge jobs exist for the receipt
    pub cross_chain_status: Option<monitor::CrossChainStatus>,
}

// ============================================================================
// BRIDGE HANDLERS
// ============================================================================

/// Handler for `POST /api/bridge/relay`.
///
/// Validates the receipt and every requested chain before creating any job:
/// a request naming one bad chain creates zero jobs. Jobs for different
/// chains are independent; each gets its own pipeline task.
pub async fn relay_handler(
    ctx: Arc<RelayerContext>,
    body: RelayRequestBody,
) -> Result<impl warp::Reply, warp::Rejection> {
    let receipt = ctx.receipts.get(&body.receipt_id).await.ok_or_else(|| {
        warp::reject::custom(NotFoundError(format!(
            "Receipt {} not found",
            body.receipt_id
        )))
    })?;

    if body.target_chains.is_empty() {
        return Err(warp::reject::custom(ValidationError(
            "target_chains must not be empty".to_string(),
        )));
    }

    let mut chains: Vec<TargetChain> = Vec::new();
    for name in &body.target_chains {
        let chain: TargetChain = name
            .parse()
            .map_err(|e: anyhow::Error| warp::reject::custom(ValidationError(e.to_string())))?;
        if chains.contains(&chain) {
            return Err(warp::reject::custom(ValidationError(format!(
                "Duplicate target chain '{}'",
                chain
            ))));
        }
        if ctx.config.chain(chain).is_none() {
            return Err(warp::reject::custom(ValidationError(format!(
                "Chain '{}' is not configured. Configured chains: {}",
                chain,
                configured_names(&ctx)
            ))));
        }
        chains.push(chain);
    }

    let mut created = Vec::new();
    for chain in chains {
        let required_confirmations = ctx
            .config
            .chain(chain)
            .expect("chain validated above")
            .required_confirmations;
        let job = BridgeJob::new(
            &receipt,
            &ctx.config.relay.source_chain,
            chain,
            required_confirmations,
            ctx.config.relay.max_attempts,
            body.metadata.clone(),
        );
        ctx.jobs.insert(job.clone()).await;
        pipeline::spawn_job_pipeline(ctx.clone(), job.clone());
        created.push(job);
    }

    info!(
        "Created {} bridge job(s) for receipt {} ({})",
        created.len(),
        receipt.id,
        receipt.content_hash
    );

    Ok(warp::reply::with_status(
        warp::reply::json(&ApiResponse::ok(created)),
        StatusCode::CREATED,
    ))
}

/// Handler for `GET /api/bridge/status/:doc_hash`.
///
/// A document hash without jobs yields an empty chain map, not an error.
pub async fn status_handler(
    doc_hash: String,
    ctx: Arc<RelayerContext>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let jobs = ctx.jobs.jobs_for_doc_hash(&doc_hash).await;
    let status = monitor::cross_chain_status(&doc_hash, &jobs);
    Ok(warp::reply::json(&ApiResponse::ok(status)))
}

/// Handler for `GET /api/bridge/jobs/:id`.
pub async fn get_job_handler(
    job_id: Uuid,
    ctx: Arc<RelayerContext>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let job = ctx.jobs.get(&job_id).await.ok_or_else(|| {
        warp::reject::custom(NotFoundError(format!("Bridge job {} not found", job_id)))
    })?;
    Ok(warp::reply::json(&ApiResponse::ok(job)))
}

/// Handler for `POST /api/bridge/jobs/:id/cancel`.
///
/// Cancellation is a compare-and-set in the job store; the pipeline task
/// stops at its next progress report. Terminal jobs cannot be cancelled.
pub async fn cancel_job_handler(
    job_id: Uuid,
    ctx: Arc<RelayerContext>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match ctx.jobs.cancel(&job_id).await {
        Ok(job) => {
            info!("Cancelled bridge job {}", job_id);
            Ok(warp::reply::json(&ApiResponse::ok(job)))
        }
        Err(JobStoreError::NotFound(_)) => Err(warp::reject::custom(NotFoundError(format!(
            "Bridge job {} not found",
            job_id
        )))),
        Err(err @ JobStoreError::Terminal { .. }) => {
            Err(warp::reject::custom(ConflictError(err.to_string())))
        }
    }
}

// ============================================================================
// RECEIPT HANDLERS
// ============================================================================

/// Handler for `POST /api/receipts`.
pub async fn create_receipt_handler(
    ctx: Arc<RelayerContext>,
    body: CreateReceiptBody,
) -> Result<impl warp::Reply, warp::Rejection> {
    config::validate_hex_value(&body.content_hash, 32).map_err(|e| {
        warp::reject::custom(ValidationError(format!("Invalid content_hash: {}", e)))
    })?;
    config::validate_hex_blob(&body.proof)
        .map_err(|e| warp::reject::custom(ValidationError(format!("Invalid proof: {}", e))))?;
    if body.receipt_type.is_empty() || body.subject_id.is_empty() {
        return Err(warp::reject::custom(ValidationError(
            "receipt_type and subject_id must not be empty".to_string(),
        )));
    }

    let receipt = ctx
        .receipts
        .insert(
            &body.receipt_type,
            &body.subject_id,
            &body.content_hash,
            &body.proof,
        )
        .await
        .map_err(|e| warp::reject::custom(ConflictError(e.to_string())))?;

    info!(
        "Registered receipt {} for subject {} (sequence {})",
        receipt.id, receipt.subject_id, receipt.sequence
    );

    Ok(warp::reply::with_status(
        warp::reply::json(&ApiResponse::ok(receipt)),
        StatusCode::CREATED,
    ))
}

/// Handler for `GET /api/receipts/:hash`.
pub async fn receipt_handler(
    content_hash: String,
    ctx: Arc<RelayerContext>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let receipt = ctx
        .receipts
        .get_by_content_hash(&content_hash)
        .await
        .ok_or_else(|| {
            warp::reject::custom(NotFoundError(format!(
                "No receipt with content hash {}",
                content_hash
            )))
        })?;

    let jobs = ctx.jobs.jobs_for_doc_hash(&content_hash).await;
    let cross_chain_status = if jobs.is_empty() {
        None
    } else {
        Some(monitor::cross_chain_status(&content_hash, &jobs))
    };

    Ok(warp::reply::json(&ApiResponse::ok(ReceiptWithStatus {
        receipt,
        cross_chain_status,
    })))
}

/// Comma-separated list of chains with a configuration block.
fn configured_names(ctx: &RelayerContext) -> String {
    ctx.config
        .configured_chains()
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ")
}
