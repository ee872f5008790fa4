//! Receipt store
//!
//! Receipts are immutable records of anchored events: once inserted they are
//! never mutated or deleted. The store assigns each receipt a UUID and a
//! per-subject sequence number that establishes a total order among receipts
//! for the same subject.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

// ============================================================================
// RECEIPT DATA STRUCTURE
// ============================================================================

/// Immutable record of an anchored event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// Unique identifier for the receipt
    pub id: Uuid,
    /// Kind of anchored event (e.g. "payment", "vote", "message")
    pub receipt_type: String,
    /// Identifier of the subject the event belongs to
    pub subject_id: String,
    /// Content hash of the anchored document (0x-prefixed, 32 bytes)
    pub content_hash: String,
    /// Proof payload submitted to target chains (0x-prefixed hex blob)
    pub proof: String,
    /// Monotonic sequence number per subject, assigned at insertion
    pub sequence: u64,
    /// Timestamp when the receipt was recorded
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// RECEIPT STORE
// ============================================================================

#[derive(Default)]
struct ReceiptStoreInner {
    /// Receipts keyed by id
    receipts: HashMap<Uuid, Receipt>,
    /// Next sequence number per subject id
    sequences: HashMap<String, u64>,
}

/// In-memory receipt store.
///
/// Content hashes are unique across the store: a relay request and a status
/// query both resolve a document hash to exactly one receipt.
#[derive(Default)]
pub struct ReceiptStore {
    inner: RwLock<ReceiptStoreInner>,
}

impl ReceiptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new receipt, assigning its id and per-subject sequence number.
    ///
    /// # Arguments
    ///
    /// * `receipt_type` - Kind of anchored event
    /// * `subject_id` - Subject the event belongs to
    /// * `content_hash` - Content hash (0x-prefixed, 32 bytes)
    /// * `proof` - Proof payload (0x-prefixed hex blob)
    ///
    /// # Returns
    ///
    /// * `Ok(Receipt)` - The stored receipt with id and sequence assigned
    /// * `Err(anyhow::Error)` - A receipt with the same content hash exists
    pub async fn insert(
        &self,
        receipt_type: &str,
        subject_id: &str,
        content_hash: &str,
        proof: &str,
    ) -> anyhow::Result<Receipt> {
        let mut inner = self.inner.write().await;

        if inner
            .receipts
            .values()
            .any(|r| r.content_hash == content_hash)
        {
            anyhow::bail!("A receipt with content hash {} already exists", content_hash);
        }

        let sequence = inner
            .sequences
            .entry(subject_id.to_string())
            .and_modify(|s| *s += 1)
            .or_insert(1);
        let sequence = *sequence;

        let receipt = Receipt {
            id: Uuid::new_v4(),
            receipt_type: receipt_type.to_string(),
            subject_id: subject_id.to_string(),
            content_hash: content_hash.to_string(),
            proof: proof.to_string(),
            sequence,
            created_at: Utc::now(),
        };
        inner.receipts.insert(receipt.id, receipt.clone());
        Ok(receipt)
    }

    /// Returns the receipt with the given id, if present.
    pub async fn get(&self, id: &Uuid) -> Option<Receipt> {
        self.inner.read().await.receipts.get(id).cloned()
    }

    /// Returns the receipt with the given content hash, if present.
    pub async fn get_by_content_hash(&self, content_hash: &str) -> Option<Receipt> {
        self.inner
            .read()
            .await
            .receipts
            .values()
            .find(|r| r.content_hash == content_hash)
            .cloned()
    }
}
