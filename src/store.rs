//! The persistence contract: document records and the store they go to.
//!
//! The store itself belongs to an external collaborator (the original system
//! wrote to a per-user document database); this crate only produces the
//! record content and speaks a two-method write contract. [`MemoryStore`]
//! implements the contract in memory for tests and the CLI demo path.

use crate::error::DocPolishError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Status tag written on every saved record.
pub const STATUS_PROCESSED: &str = "processed";

/// One processed document, as persisted per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub doc_id: String,
    /// Display name — the uploaded filename.
    pub name: String,
    /// Original text, truncated to the storage cap.
    pub original_content: String,
    /// Enhanced text, truncated to the storage cap.
    pub enhanced_content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: String,
}

impl DocumentRecord {
    /// Build a record, truncating both texts to `max_stored_chars`
    /// characters (never mid code point).
    pub fn new(
        name: impl Into<String>,
        original: &str,
        enhanced: &str,
        max_stored_chars: usize,
    ) -> Self {
        let now = Utc::now();
        Self {
            doc_id: Uuid::new_v4().to_string(),
            name: name.into(),
            original_content: truncate_chars(original, max_stored_chars),
            enhanced_content: truncate_chars(enhanced, max_stored_chars),
            created_at: now,
            updated_at: now,
            status: STATUS_PROCESSED.to_string(),
        }
    }
}

/// Write contract against the external document store.
///
/// `save` persists one record under a user and returns its identifier; a
/// successful save increases that user's `document_count` by exactly 1.
pub trait DocumentStore: Send + Sync {
    fn save(&self, user_id: &str, record: DocumentRecord) -> Result<String, DocPolishError>;

    fn document_count(&self, user_id: &str) -> Result<u64, DocPolishError>;
}

/// In-memory store for tests and the CLI demo.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Vec<DocumentRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one user's records, in save order.
    ///
    /// A poisoned lock yields an empty snapshot, matching how `save` and
    /// `document_count` refuse rather than panic.
    pub fn records_for(&self, user_id: &str) -> Vec<DocumentRecord> {
        self.records
            .read()
            .map(|m| m.get(user_id).cloned().unwrap_or_default())
            .unwrap_or_default()
    }
}

impl DocumentStore for MemoryStore {
    fn save(&self, user_id: &str, record: DocumentRecord) -> Result<String, DocPolishError> {
        let id = record.doc_id.clone();
        self.records
            .write()
            .map_err(|_| DocPolishError::StoreFailed {
                detail: "store lock poisoned".into(),
            })?
            .entry(user_id.to_string())
            .or_default()
            .push(record);
        Ok(id)
    }

    fn document_count(&self, user_id: &str) -> Result<u64, DocPolishError> {
        Ok(self
            .records
            .read()
            .map_err(|_| DocPolishError::StoreFailed {
                detail: "store lock poisoned".into(),
            })?
            .get(user_id)
            .map(|v| v.len() as u64)
            .unwrap_or(0))
    }
}

/// Truncate to a character count without splitting a code point.
fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
