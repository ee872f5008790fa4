//! Cross-chain status aggregation
//!
//! Folds all bridge jobs for one document hash into a per-chain view. Pure
//! computation over its inputs: same jobs in, same view out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::TargetChain;
use crate::storage::{BridgeJob, JobStatus};

/// Relay state of one document on one target chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainStatus {
    pub status: JobStatus,
    pub tx_hash: Option<String>,
    pub confirmations: u64,
    /// Most recent error, kept visible for failed and timed-out jobs
    pub last_error: Option<String>,
}

/// Aggregated relay state of one document across all target chains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossChainStatus {
    pub doc_hash: String,
    /// One entry per target chain that has at least one job, failed ones
    /// included
    pub chains: BTreeMap<TargetChain, ChainStatus>,
}

/// Aggregates all known jobs for a document hash into a per-chain map.
///
/// Includes exactly the chains present in `jobs`. When a chain has several
/// jobs (a relay was re-triggered manually), the most recently created one
/// represents the chain.
pub fn cross_chain_status(doc_hash: &str, jobs: &[BridgeJob]) -> CrossChainStatus {
    let mut latest: BTreeMap<TargetChain, &BridgeJob> = BTreeMap::new();
    for job in jobs {
        match latest.get(&job.target_chain) {
            Some(existing) if existing.created_at >= job.created_at => {}
            _ => {
                latest.insert(job.target_chain, job);
            }
        }
    }

    let chains = latest
        .into_iter()
        .map(|(chain, job)| {
            (
                chain,
                ChainStatus {
                    status: job.status,
                    tx_hash: job.tx_hash.clone(),
                    confirmations: job.confirmations,
                    last_error: job.last_error.clone(),
                },
            )
        })
        .collect();

    CrossChainStatus {
        doc_hash: doc_hash.to_string(),
        chains,
    }
}
