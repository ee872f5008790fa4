//! Persistence Module
//!
//! In-memory stores for receipts and bridge jobs. Both stores are shared
//! behind `Arc` and guard their maps with a `tokio::sync::RwLock`; jobs are
//! never deleted so the job table doubles as an audit trail.

pub mod jobs;
pub mod receipts;

pub use jobs::{BridgeJob, BridgeJobStore, JobObserver, JobStatus, JobStoreError, JobUpdate};
pub use receipts::{Receipt, ReceiptStore};
