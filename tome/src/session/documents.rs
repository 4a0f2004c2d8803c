use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::error::{Result, TomeError};
use crate::models::{Document, DocumentStatus, DocumentSummary};

/// Session-scoped document list.
///
/// Owns every document exclusively; deletion is a pure list removal. The
/// store is the single place that enforces the lifecycle state machine:
/// `processing → ready` and `processing → failed` are the only legal
/// transitions, and terminal states are never overwritten.
#[derive(Clone, Default)]
pub struct DocumentStore {
    inner: Arc<Mutex<HashMap<String, Document>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, doc: Document) {
        let mut docs = self.inner.lock().unwrap();
        docs.insert(doc.id.clone(), doc);
    }

    pub fn get(&self, id: &str) -> Option<Document> {
        self.inner.lock().unwrap().get(id).cloned()
    }

    /// Summaries in creation order, oldest first.
    pub fn list(&self) -> Vec<DocumentSummary> {
        let docs = self.inner.lock().unwrap();
        let mut summaries: Vec<DocumentSummary> = docs.values().map(DocumentSummary::from).collect();
        summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        summaries
    }

    pub fn remove(&self, id: &str) -> bool {
        self.inner.lock().unwrap().remove(id).is_some()
    }

    /// Ids of all documents currently queryable.
    pub fn ready_ids(&self) -> Vec<String> {
        let docs = self.inner.lock().unwrap();
        let mut ids: Vec<(chrono::DateTime<Utc>, String)> = docs
            .values()
            .filter(|doc| doc.is_ready())
            .map(|doc| (doc.created_at, doc.id.clone()))
            .collect();
        ids.sort();
        ids.into_iter().map(|(_, id)| id).collect()
    }

    pub fn mark_ready(&self, id: &str, chunk_count: u32, embeddings_generated: bool) -> Result<()> {
        self.transition(id, |doc| {
            doc.status = DocumentStatus::Ready;
            doc.chunk_count = chunk_count;
            doc.embeddings_generated = embeddings_generated;
            doc.error_message = None;
        })
    }

    pub fn mark_failed(&self, id: &str, message: &str) -> Result<()> {
        self.transition(id, |doc| {
            doc.status = DocumentStatus::Failed;
            doc.error_message = Some(message.to_string());
        })
    }

    fn transition<F>(&self, id: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Document),
    {
        let mut docs = self.inner.lock().unwrap();
        let doc = docs
            .get_mut(id)
            .ok_or_else(|| TomeError::NotFound(format!("Document {id} not found")))?;

        if doc.status.is_terminal() {
            return Err(TomeError::Validation(format!(
                "Document {id} is already {} and cannot transition",
                doc.status
            )));
        }

        apply(doc);
        doc.updated_at = Utc::now();
        Ok(())
    }
}
