//! EVM JSON-RPC Client Module
//!
//! This module provides a minimal client for the two interactions the
//! relayer has with a target chain: submitting a receipt's proof payload as
//! a raw transaction, and reading back the confirmation depth of a
//! submitted transaction.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ============================================================================
// JSON-RPC TYPES
// ============================================================================

#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    message: String,
}

/// Transaction receipt fields the monitor cares about.
#[derive(Debug, Deserialize)]
struct TxReceipt {
    /// Block the transaction was included in (hex); absent while pending
    #[serde(rename = "blockNumber")]
    block_number: Option<String>,
    /// Execution status: 0x1 success, 0x0 reverted
    status: Option<String>,
}

// ============================================================================
// TRANSACTION STATUS
// ============================================================================

/// Observed state of a submitted transaction on the target chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    /// The chain does not know the transaction (not yet indexed, or dropped)
    NotFound,
    /// The transaction is included with the given confirmation depth
    Included { confirmations: u64 },
    /// The transaction was included but reverted
    Reverted,
}

// ============================================================================
// CLIENT
// ============================================================================

/// JSON-RPC client for one target chain.
#[derive(Debug, Clone)]
pub struct EvmClient {
    client: Client,
    rpc_url: String,
}

impl EvmClient {
    /// Creates a client for the given endpoint with a per-request timeout.
    pub fn new(rpc_url: &str, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .no_proxy()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            rpc_url: rpc_url.to_string(),
        })
    }

    /// Performs one JSON-RPC call and returns the raw `result` field.
    ///
    /// A `null` result is returned as `None`; JSON-RPC error objects are
    /// surfaced as errors with the server-provided message.
    async fn rpc<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<Option<T>> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        };

        let response: JsonRpcResponse<T> = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to call {}", method))?
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", method))?;

        if let Some(error) = response.error {
            return Err(anyhow::anyhow!("RPC error from {}: {}", method, error.message));
        }

        Ok(response.result)
    }

    /// Submits a proof payload as a raw transaction.
    ///
    /// # Arguments
    ///
    /// * `proof` - Pre-built transaction payload (0x-prefixed hex blob)
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Transaction hash assigned by the chain
    /// * `Err(anyhow::Error)` - Transport failure or chain-side rejection
    pub async fn submit_proof(&self, proof: &str) -> Result<String> {
        self.rpc::<String>("eth_sendRawTransaction", serde_json::json!([proof]))
            .await?
            .ok_or_else(|| anyhow::anyhow!("eth_sendRawTransaction returned no transaction hash"))
    }

    /// Reads the confirmation state of a submitted transaction.
    ///
    /// Confirmation depth is `head - inclusion_block + 1`, so a transaction
    /// in the head block has one confirmation.
    pub async fn transaction_status(&self, tx_hash: &str) -> Result<TxStatus> {
        let receipt: Option<TxReceipt> = self
            .rpc("eth_getTransactionReceipt", serde_json::json!([tx_hash]))
            .await?;

        let receipt = match receipt {
            Some(receipt) => receipt,
            None => return Ok(TxStatus::NotFound),
        };

        if let Some(status) = &receipt.status {
            if parse_hex_u64(status)? == 0 {
                return Ok(TxStatus::Reverted);
            }
        }

        let block_number = match &receipt.block_number {
            Some(block_number) => parse_hex_u64(block_number)?,
            // Receipt exists but the transaction is not yet in a block
            None => return Ok(TxStatus::NotFound),
        };

        let head: String = self
            .rpc("eth_blockNumber", serde_json::json!([]))
            .await?
            .ok_or_else(|| anyhow::anyhow!("eth_blockNumber returned no result"))?;
        let head = parse_hex_u64(&head)?;

        let confirmations = head.saturating_sub(block_number).saturating_add(1);
        Ok(TxStatus::Included { confirmations })
    }
}

/// Parses a 0x-prefixed hex quantity into a u64.
fn parse_hex_u64(value: &str) -> Result<u64> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    u64::from_str_radix(stripped, 16)
        .with_context(|| format!("Invalid hex quantity '{}'", value))
}
