use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DocumentOrigin, DocumentStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub origin: DocumentOrigin,
    pub status: DocumentStatus,
    pub chunk_count: u32,
    pub embeddings_generated: bool,
    /// Provider selectors used during ingestion, retained for diagnostics.
    pub extraction_provider: String,
    pub embedding_provider: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(id: String, name: String, origin: DocumentOrigin) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            origin,
            status: DocumentStatus::Processing,
            chunk_count: 0,
            embeddings_generated: false,
            extraction_provider: String::new(),
            embedding_provider: String::new(),
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == DocumentStatus::Ready
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: String,
    pub name: String,
    pub origin: DocumentOrigin,
    pub status: DocumentStatus,
    pub chunk_count: u32,
    pub embeddings_generated: bool,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            name: doc.name.clone(),
            origin: doc.origin,
            status: doc.status,
            chunk_count: doc.chunk_count,
            embeddings_generated: doc.embeddings_generated,
            error_message: doc.error_message.clone(),
            created_at: doc.created_at,
        }
    }
}

/// Returned immediately when an ingestion is accepted, before any external
/// call has been made.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReceipt {
    pub id: String,
    pub status: DocumentStatus,
}
