//! Unit tests for the EVM JSON-RPC client
//!
//! These tests verify the two chain interactions the relayer performs:
//! submitting a proof payload and reading back a transaction's confirmation
//! state, including the JSON-RPC error and null-result shapes.

use std::time::Duration;

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use relayer::evm_client::{EvmClient, TxStatus};

#[path = "mod.rs"]
mod test_helpers;
use test_helpers::{
    mount_block_number, mount_submit_error, mount_submit_success, mount_tx_receipt,
    mount_tx_receipt_null, rpc_result, DUMMY_PROOF, DUMMY_TX_HASH,
};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn client_for(server: &MockServer) -> EvmClient {
    EvmClient::new(&server.uri(), Duration::from_secs(2)).unwrap()
}

// ============================================================================
// SUBMISSION TESTS
// ============================================================================

/// Test that a successful submission returns the chain-assigned hash
#[tokio::test]
async fn test_submit_proof_returns_tx_hash() {
    let server = MockServer::start().await;
    mount_submit_success(&server, DUMMY_TX_HASH).await;

    let tx_hash = client_for(&server).submit_proof(DUMMY_PROOF).await.unwrap();
    assert_eq!(tx_hash, DUMMY_TX_HASH);
}

/// Test that a JSON-RPC error object surfaces as an error with its message
/// Why: the relay service records this message as the job's last error
#[tokio::test]
async fn test_submit_proof_surfaces_rpc_error() {
    let server = MockServer::start().await;
    mount_submit_error(&server, "nonce too low").await;

    let err = client_for(&server)
        .submit_proof(DUMMY_PROOF)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("nonce too low"));
}

/// Test that an unreachable endpoint surfaces as a transport error
#[tokio::test]
async fn test_submit_proof_unreachable_endpoint() {
    let client = EvmClient::new("http://127.0.0.1:19999", Duration::from_millis(200)).unwrap();

    let err = client.submit_proof(DUMMY_PROOF).await.unwrap_err();
    assert!(err.to_string().contains("eth_sendRawTransaction"));
}

// ============================================================================
// TRANSACTION STATUS TESTS
// ============================================================================

/// Test that a null receipt maps to NotFound
/// Why: a just-submitted transaction is not indexed yet and must not be
/// treated as dropped
#[tokio::test]
async fn test_transaction_status_not_found() {
    let server = MockServer::start().await;
    mount_tx_receipt_null(&server).await;

    let status = client_for(&server)
        .transaction_status(DUMMY_TX_HASH)
        .await
        .unwrap();
    assert_eq!(status, TxStatus::NotFound);
}

/// Test the confirmation depth computation
/// Why: depth is head - inclusion + 1, so a transaction in the head block
/// has exactly one confirmation
#[tokio::test]
async fn test_transaction_status_confirmation_depth() {
    let server = MockServer::start().await;
    // Included at block 100 with the head at 100
    mount_tx_receipt(&server, "0x64", "0x1").await;
    mount_block_number(&server, "0x64").await;

    let status = client_for(&server)
        .transaction_status(DUMMY_TX_HASH)
        .await
        .unwrap();
    assert_eq!(status, TxStatus::Included { confirmations: 1 });
}

/// Test that a reverted execution status maps to Reverted
#[tokio::test]
async fn test_transaction_status_reverted() {
    let server = MockServer::start().await;
    mount_tx_receipt(&server, "0x64", "0x0").await;

    let status = client_for(&server)
        .transaction_status(DUMMY_TX_HASH)
        .await
        .unwrap();
    assert_eq!(status, TxStatus::Reverted);
}

/// Test that a receipt without a block number maps to NotFound
/// Why: some nodes return a receipt object before inclusion; without a
/// block there is no depth to report
#[tokio::test]
async fn test_transaction_status_pending_receipt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(serde_json::json!({
            "method": "eth_getTransactionReceipt"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(serde_json::json!({
            "blockNumber": null,
            "status": null,
        }))))
        .mount(&server)
        .await;

    let status = client_for(&server)
        .transaction_status(DUMMY_TX_HASH)
        .await
        .unwrap();
    assert_eq!(status, TxStatus::NotFound);
}

/// Test that a malformed hex quantity in the response is an error
#[tokio::test]
async fn test_transaction_status_invalid_hex() {
    let server = MockServer::start().await;
    mount_tx_receipt(&server, "not-hex", "0x1").await;

    let err = client_for(&server)
        .transaction_status(DUMMY_TX_HASH)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not-hex"));
}
