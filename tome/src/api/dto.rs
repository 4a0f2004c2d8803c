use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{QueryScope, RetrievalBackend};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IngestUrlRequest {
    #[validate(length(min = 1, max = 2048))]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatQueryRequest {
    #[validate(length(min = 1, max = 4000))]
    pub question: String,
    /// Restricts the query to one document; absent means all ready
    /// documents.
    pub document_id: Option<String>,
    #[serde(default)]
    pub backend: RetrievalBackend,
    pub model: Option<String>,
}

impl ChatQueryRequest {
    pub fn scope(&self) -> QueryScope {
        match &self.document_id {
            Some(id) => QueryScope::Document(id.clone()),
            None => QueryScope::AllDocuments,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub documents: usize,
    pub exchanges: usize,
}
