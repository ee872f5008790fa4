//! Shared service context
//!
//! One context object owns everything the route layer and the per-job
//! pipeline tasks share: the configuration, one JSON-RPC client per
//! configured chain, and the two stores. Handlers and spawned tasks receive
//! an `Arc` of it; there is no process-global state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};

use crate::config::{Config, TargetChain};
use crate::evm_client::EvmClient;
use crate::storage::{BridgeJobStore, ReceiptStore};

/// Shared state for the relayer service.
pub struct RelayerContext {
    /// Service configuration
    pub config: Arc<Config>,
    /// One JSON-RPC client per configured target chain
    pub clients: HashMap<TargetChain, EvmClient>,
    /// Receipt store
    pub receipts: Arc<ReceiptStore>,
    /// Bridge job table
    pub jobs: Arc<BridgeJobStore>,
}

impl RelayerContext {
    /// Builds the context from a validated configuration, creating one
    /// client per configured chain.
    pub fn new(config: Config) -> Result<Self> {
        let request_timeout = Duration::from_millis(config.relay.request_timeout_ms);

        let mut clients = HashMap::new();
        for chain in config.configured_chains() {
            let chain_config = config.chain(chain).expect("configured chain has a block");
            let client = EvmClient::new(&chain_config.rpc_url, request_timeout)
                .with_context(|| format!("Failed to create client for chain {}", chain))?;
            clients.insert(chain, client);
        }

        Ok(Self {
            config: Arc::new(config),
            clients,
            receipts: Arc::new(ReceiptStore::new()),
            jobs: Arc::new(BridgeJobStore::new()),
        })
    }
}
