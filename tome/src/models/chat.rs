use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{RetrievalBackend, RetrievalSource};

/// Per-query measurements attached to a resolved exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryDiagnostics {
    pub backend: RetrievalBackend,
    pub model: String,
    pub elapsed_ms: u64,
    pub source_count: u32,
    pub cache_hit: bool,
}

/// One question/answer pair in the session transcript.
///
/// Appended only once resolved: with a real answer, or with error content
/// when the backend failed. A cancelled query appends nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatExchange {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub sources: Vec<RetrievalSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<QueryDiagnostics>,
    pub created_at: DateTime<Utc>,
}

impl ChatExchange {
    pub fn answered(
        question: String,
        answer: String,
        sources: Vec<RetrievalSource>,
        diagnostics: QueryDiagnostics,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            question,
            answer,
            sources,
            diagnostics: Some(diagnostics),
            created_at: Utc::now(),
        }
    }

    /// Error-content exchange for a query that reached a backend and
    /// failed. Keeps the transcript consistent with what happened.
    pub fn errored(question: String, message: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            question,
            answer: message,
            sources: Vec::new(),
            diagnostics: None,
            created_at: Utc::now(),
        }
    }

    /// Transcript entry with no triggering question, used to surface
    /// ingestion failures.
    pub fn notice(message: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            question: String::new(),
            answer: message,
            sources: Vec::new(),
            diagnostics: None,
            created_at: Utc::now(),
        }
    }
}
