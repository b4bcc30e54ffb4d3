//! In-memory document registry (mock ingestion)
//!
//! Records the filename and byte size of uploaded documents in upload order.
//! Content is not parsed, chunked or embedded yet; the ingest receipt reports a
//! mock "embedded" status so callers can be built against the final shape.
//! Records live only as long as the process.

use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::DocumentRecord;

/// Chunk count reported until a real text splitter exists
pub const MOCK_CHUNK_COUNT: usize = 10;

/// Processing state reported for an ingested document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Embedded,
}

/// Response for a registered document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReceipt {
    pub record: DocumentRecord,
    pub status: IngestStatus,
    pub chunks_count: usize,
    pub message: String,
}

/// Snapshot of the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentListing {
    pub documents: Vec<DocumentRecord>,
    pub total: usize,
}

/// Append-only list of uploaded documents
///
/// Appends and listings take the same lock, so `total` always equals the
/// number of records returned alongside it.
#[derive(Debug, Default)]
pub struct DocumentRegistry {
    records: Mutex<Vec<DocumentRecord>>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an uploaded document; duplicates are kept
    pub fn register(&self, filename: &str, content: &[u8]) -> DocumentRecord {
        let record = DocumentRecord {
            filename: filename.to_string(),
            size: content.len(),
            uploaded_at: Utc::now(),
        };

        let total = {
            // A panic mid-push cannot leave a partial record, so a poisoned lock is still usable
            let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
            records.push(record.clone());
            records.len()
        };

        info!(filename = %record.filename, size = record.size, total, "Document registered");
        record
    }

    /// Register a document and produce the mock ingest receipt
    pub fn ingest(&self, filename: &str, content: &[u8]) -> IngestReceipt {
        let record = self.register(filename, content);
        let message = format!(
            "Document '{}' has been successfully embedded into vector DB (mock)",
            record.filename
        );
        IngestReceipt {
            record,
            status: IngestStatus::Embedded,
            chunks_count: MOCK_CHUNK_COUNT,
            message,
        }
    }

    pub fn list_all(&self) -> DocumentListing {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        DocumentListing {
            documents: records.clone(),
            total: records.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
