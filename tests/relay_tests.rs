//! Unit tests for the relay service
//!
//! These tests drive `retry_relay` against mock JSON-RPC chains and verify
//! the retry bound, the backoff curve, and the progress reports the relay
//! emits after every attempt.

use std::time::Duration;

use wiremock::MockServer;

use relayer::evm_client::EvmClient;
use relayer::relay::{backoff_delay, retry_relay, RelayOutcome, RelayRequest};
use relayer::storage::{BridgeJobStore, JobStatus};
use relayer::TargetChain;

#[path = "mod.rs"]
mod test_helpers;
use test_helpers::{
    build_test_config, create_default_job, create_default_receipt, mount_submit_error,
    mount_submit_error_n_times, mount_submit_success, RecordingObserver, DUMMY_TX_HASH,
};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn client_for(server: &MockServer) -> EvmClient {
    EvmClient::new(&server.uri(), Duration::from_secs(2)).unwrap()
}

fn request_for_job(job: &relayer::BridgeJob, receipt: relayer::Receipt) -> RelayRequest {
    RelayRequest {
        job_id: job.id,
        receipt,
        target_chain: job.target_chain,
    }
}

// ============================================================================
// SUCCESS PATH TESTS
// ============================================================================

/// Test that a first-attempt success reports pending-confirmation with the
/// transaction hash
/// Why: the happy path must leave the job submitted after exactly one attempt
#[tokio::test]
async fn test_relay_succeeds_first_attempt() {
    let server = MockServer::start().await;
    mount_submit_success(&server, DUMMY_TX_HASH).await;

    let config = build_test_config();
    let store = BridgeJobStore::new();
    let receipt = create_default_receipt();
    let job = create_default_job(&receipt, TargetChain::Polygon);
    store.insert(job.clone()).await;

    let outcome = retry_relay(
        &client_for(&server),
        &request_for_job(&job, receipt),
        &config.relay,
        &store,
    )
    .await;

    assert_eq!(
        outcome,
        RelayOutcome::Submitted {
            tx_hash: DUMMY_TX_HASH.to_string()
        }
    );

    let stored = store.get(&job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::PendingConfirmation);
    assert_eq!(stored.attempts, 1);
    assert_eq!(stored.tx_hash.as_deref(), Some(DUMMY_TX_HASH));
    assert!(stored.completed_at.is_none());
}

/// Test that transient failures are retried and the relay recovers
/// Why: two failures with one attempt left must still produce a submission
#[tokio::test]
async fn test_relay_recovers_after_transient_failures() {
    let server = MockServer::start().await;
    // First two submissions fail, the third one succeeds
    mount_submit_error_n_times(&server, "nonce conflict", 2).await;
    mount_submit_success(&server, DUMMY_TX_HASH).await;

    let config = build_test_config();
    let store = BridgeJobStore::new();
    let receipt = create_default_receipt();
    let job = create_default_job(&receipt, TargetChain::Arbitrum);
    store.insert(job.clone()).await;

    let outcome = retry_relay(
        &client_for(&server),
        &request_for_job(&job, receipt),
        &config.relay,
        &store,
    )
    .await;

    assert_eq!(
        outcome,
        RelayOutcome::Submitted {
            tx_hash: DUMMY_TX_HASH.to_string()
        }
    );

    let stored = store.get(&job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::PendingConfirmation);
    assert_eq!(stored.attempts, 3);
    // The error from the failed attempts stays on the job record
    assert!(stored.last_error.unwrap().contains("nonce conflict"));
}

// ============================================================================
// FAILURE PATH TESTS
// ============================================================================

/// Test that exhausting the attempt bound fails the job terminally
/// Why: after max_attempts the job must be failed with its last error and
/// receive no further automatic attempts
#[tokio::test]
async fn test_relay_exhausts_attempts() {
    let server = MockServer::start().await;
    mount_submit_error(&server, "insufficient funds for gas").await;

    let config = build_test_config();
    let store = BridgeJobStore::new();
    let receipt = create_default_receipt();
    let job = create_default_job(&receipt, TargetChain::Arbitrum);
    store.insert(job.clone()).await;

    let outcome = retry_relay(
        &client_for(&server),
        &request_for_job(&job, receipt),
        &config.relay,
        &store,
    )
    .await;

    assert_eq!(outcome, RelayOutcome::Failed);

    let stored = store.get(&job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(stored.attempts, config.relay.max_attempts);
    assert!(stored
        .last_error
        .unwrap()
        .contains("insufficient funds for gas"));
    assert!(stored.tx_hash.is_none());
    assert!(stored.completed_at.is_some());

    // Exactly max_attempts submissions reached the chain
    let submissions = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| {
            String::from_utf8_lossy(&r.body).contains("eth_sendRawTransaction")
        })
        .count();
    assert_eq!(submissions, config.relay.max_attempts as usize);
}

/// Test that every attempt is reported through the observer
/// Why: the caller persists from these reports; a silent attempt would make
/// the audit trail lie
#[tokio::test]
async fn test_relay_reports_every_attempt() {
    let server = MockServer::start().await;
    mount_submit_error_n_times(&server, "connection reset", 1).await;
    mount_submit_success(&server, DUMMY_TX_HASH).await;

    let config = build_test_config();
    let observer = RecordingObserver::new();
    let receipt = create_default_receipt();
    let job = create_default_job(&receipt, TargetChain::Polygon);

    let outcome = retry_relay(
        &client_for(&server),
        &request_for_job(&job, receipt),
        &config.relay,
        &observer,
    )
    .await;
    assert!(matches!(outcome, RelayOutcome::Submitted { .. }));

    // submitting, attempt-1 failure, submitting, submitted
    let statuses = observer.statuses().await;
    assert_eq!(
        statuses,
        vec![
            JobStatus::Submitting,
            JobStatus::Pending,
            JobStatus::Submitting,
            JobStatus::PendingConfirmation,
        ]
    );
}

/// Test that a cancelled job aborts the relay instead of retrying
/// Why: a terminal job must stop its pipeline at the next progress report
#[tokio::test]
async fn test_relay_aborts_on_cancelled_job() {
    let server = MockServer::start().await;
    mount_submit_success(&server, DUMMY_TX_HASH).await;

    let config = build_test_config();
    let store = BridgeJobStore::new();
    let receipt = create_default_receipt();
    let job = create_default_job(&receipt, TargetChain::Polygon);
    store.insert(job.clone()).await;
    store.cancel(&job.id).await.unwrap();

    let outcome = retry_relay(
        &client_for(&server),
        &request_for_job(&job, receipt),
        &config.relay,
        &store,
    )
    .await;

    assert_eq!(outcome, RelayOutcome::Aborted);
    let stored = store.get(&job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Cancelled);
    assert_eq!(stored.attempts, 0);
}

// ============================================================================
// BACKOFF TESTS
// ============================================================================

/// Test that the backoff delay never shrinks as retries accumulate
/// Why: successive retries must not hammer the target chain faster over time
#[test]
fn test_backoff_delay_monotonic() {
    let mut previous = Duration::ZERO;
    for retry in 1..=10 {
        let delay = backoff_delay(50, retry);
        assert!(delay >= previous, "Backoff must be non-decreasing");
        previous = delay;
    }
    assert_eq!(backoff_delay(50, 1), Duration::from_millis(50));
    assert_eq!(backoff_delay(50, 3), Duration::from_millis(150));
}
