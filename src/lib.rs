//! Relayer Service Library
//!
//! This crate provides a relay service that anchors receipts across EVM
//! chains: it submits receipt proofs to target chains with bounded retry,
//! monitors transaction confirmations, and aggregates per-chain status for
//! each relayed document.

pub mod api;
pub mod config;
pub mod context;
pub mod evm_client;
pub mod monitor;
pub mod relay;
pub mod storage;

// Re-export commonly used types
pub use config::{ApiConfig, ChainConfig, ChainsConfig, Config, MonitorConfig, RelayConfig, TargetChain};
pub use context::RelayerContext;
pub use monitor::{cross_chain_status, ChainStatus, CrossChainStatus};
pub use storage::{BridgeJob, BridgeJobStore, JobObserver, JobStatus, JobStoreError, JobUpdate, Receipt, ReceiptStore};
