//! Shared test helpers for unit tests
//!
//! This module provides helper functions used by unit tests:
//! - **Constants**: Dummy hashes, proofs, and tokens
//! - **Configuration Builders**: Functions to create test configurations
//! - **Default Object Creators**: Receipts and bridge jobs with test values
//! - **RecordingObserver**: A job observer that records updates for assertions

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use relayer::config::{ApiConfig, ChainConfig, ChainsConfig, Config, MonitorConfig, RelayConfig};
use relayer::storage::{BridgeJob, JobObserver, JobStatus, JobUpdate, Receipt};
use relayer::TargetChain;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Dummy document content hash (32 bytes, valid hex format)
pub const DUMMY_DOC_HASH: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000001";

/// Second dummy document content hash, for multi-receipt tests
#[allow(dead_code)]
pub const DUMMY_DOC_HASH_2: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000002";

/// Dummy proof payload (arbitrary even-length hex blob)
pub const DUMMY_PROOF: &str = "0xdeadbeefdeadbeefdeadbeef";

/// Dummy transaction hash returned by mock chains
#[allow(dead_code)]
pub const DUMMY_TX_HASH: &str =
    "0x00000000000000000000000000000000000000000000000000000000000000aa";

/// Dummy subject identifier
pub const DUMMY_SUBJECT_ID: &str = "subject-1";

/// Admin token used by all test configurations
pub const TEST_ADMIN_TOKEN: &str = "test-admin-token";

// ============================================================================
// CONFIGURATION BUILDERS
// ============================================================================

/// Build a valid in-memory test configuration with all three chains
/// configured against unreachable local endpoints. Timing parameters are
/// shrunk so retry and polling paths finish quickly in tests.
pub fn build_test_config() -> Config {
    build_test_config_with_urls(
        "http://127.0.0.1:18545",
        "http://127.0.0.1:18546",
        "http://127.0.0.1:18547",
    )
}

/// Build a test configuration pointing each chain at the given endpoint,
/// typically a wiremock server URL.
pub fn build_test_config_with_urls(polygon: &str, arbitrum: &str, optimism: &str) -> Config {
    Config {
        chains: ChainsConfig {
            polygon: Some(ChainConfig {
                rpc_url: polygon.to_string(),
                required_confirmations: 12,
            }),
            arbitrum: Some(ChainConfig {
                rpc_url: arbitrum.to_string(),
                required_confirmations: 6,
            }),
            optimism: Some(ChainConfig {
                rpc_url: optimism.to_string(),
                required_confirmations: 6,
            }),
        },
        relay: RelayConfig {
            source_chain: "mainnet".to_string(),
            max_attempts: 3,
            initial_backoff_ms: 10,
            request_timeout_ms: 2000,
        },
        monitor: MonitorConfig {
            poll_interval_ms: 10,
            max_poll_ticks: 5,
        },
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 3999,
            cors_origins: vec![],
            admin_token: TEST_ADMIN_TOKEN.to_string(),
        },
    }
}

// ============================================================================
// DEFAULT OBJECT CREATORS
// ============================================================================

/// Create a default receipt with test values.
/// This can be customized using Rust's struct update syntax:
/// ```
/// let receipt = create_default_receipt();
/// let custom = Receipt { sequence: 7, ..receipt };
/// ```
pub fn create_default_receipt() -> Receipt {
    Receipt {
        id: Uuid::new_v4(),
        receipt_type: "payment".to_string(),
        subject_id: DUMMY_SUBJECT_ID.to_string(),
        content_hash: DUMMY_DOC_HASH.to_string(),
        proof: DUMMY_PROOF.to_string(),
        sequence: 1,
        created_at: Utc::now(),
    }
}

/// Create a default pending bridge job for the given receipt and chain,
/// with the thresholds used by `build_test_config`.
pub fn create_default_job(receipt: &Receipt, target_chain: TargetChain) -> BridgeJob {
    let required_confirmations = match target_chain {
        TargetChain::Polygon => 12,
        TargetChain::Arbitrum | TargetChain::Optimism => 6,
    };
    BridgeJob::new(receipt, "mainnet", target_chain, required_confirmations, 3, None)
}

// ============================================================================
// RECORDING OBSERVER
// ============================================================================

/// Job observer that records every update instead of persisting it.
/// Always accepts updates.
#[derive(Default)]
pub struct RecordingObserver {
    pub updates: Mutex<Vec<(Uuid, JobUpdate)>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statuses reported so far, in order.
    #[allow(dead_code)]
    pub async fn statuses(&self) -> Vec<JobStatus> {
        self.updates
            .lock()
            .await
            .iter()
            .filter_map(|(_, update)| update.status)
            .collect()
    }
}

#[async_trait]
impl JobObserver for RecordingObserver {
    async fn record(&self, job_id: Uuid, update: JobUpdate) -> bool {
        self.updates.lock().await.push((job_id, update));
        true
    }
}
