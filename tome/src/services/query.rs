use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::config::RetrievalConfig;
use crate::error::{Result, TomeError};
use crate::models::{
    ChatExchange, QueryDiagnostics, QueryScope, RetrievalBackend,
};
use crate::retrieval::{
    normalize, QueryCache, QuerySlot, RawRetrieval, RetrievalOutcome, VectorSearchClient,
    VisionQueryClient,
};
use crate::session::{DocumentStore, Transcript};

#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub question: String,
    pub scope: QueryScope,
    pub backend: RetrievalBackend,
    /// Overrides the configured retrieval model for this query.
    pub model: Option<String>,
}

/// Dispatches questions to the chosen retrieval backend.
///
/// Validation happens before the cache or the network is touched. Identical
/// requests within the TTL share one backend call through [`QueryCache`],
/// and a new query supersedes the previous one in the slot. The superseded
/// caller gets [`TomeError::Cancelled`] and nothing is appended for it.
#[derive(Clone)]
pub struct QueryService {
    documents: DocumentStore,
    transcript: Transcript,
    vector: VectorSearchClient,
    vision: VisionQueryClient,
    cache: Arc<QueryCache>,
    slot: Arc<QuerySlot>,
    config: RetrievalConfig,
}

impl QueryService {
    pub fn new(
        documents: DocumentStore,
        transcript: Transcript,
        vector: VectorSearchClient,
        vision: VisionQueryClient,
        config: &RetrievalConfig,
        shutdown: CancellationToken,
    ) -> Self {
        let cache = Arc::new(QueryCache::new(
            config.cache_capacity,
            Duration::from_secs(config.cache_ttl_secs),
        ));
        Self {
            documents,
            transcript,
            vector,
            vision,
            cache,
            slot: Arc::new(QuerySlot::new(shutdown)),
            config: config.clone(),
        }
    }

    /// Cancels whatever query is currently in flight, e.g. on view
    /// teardown. The cancelled caller sees no user-visible error.
    pub fn cancel_current(&self) {
        self.slot.cancel_current();
    }

    pub async fn query(&self, request: QueryRequest) -> Result<ChatExchange> {
        match self.execute(&request).await {
            Ok(exchange) => {
                self.transcript.append(exchange.clone());
                Ok(exchange)
            }
            // Superseded, not failed: leave no trace in the transcript.
            Err(TomeError::Cancelled) => Err(TomeError::Cancelled),
            // Rejected before any network call; the turn never started.
            Err(e @ (TomeError::Validation(_) | TomeError::NotFound(_))) => Err(e),
            Err(error) => {
                tracing::error!(
                    backend = %request.backend,
                    error = %error,
                    "Query failed, recording error exchange"
                );
                let exchange = ChatExchange::errored(
                    request.question.clone(),
                    format!(
                        "The {} backend could not answer this question: {error}",
                        request.backend
                    ),
                );
                self.transcript.append(exchange.clone());
                Ok(exchange)
            }
        }
    }

    async fn execute(&self, request: &QueryRequest) -> Result<ChatExchange> {
        let question = request.question.trim();
        if question.is_empty() {
            return Err(TomeError::Validation("Question cannot be empty".to_string()));
        }

        let scope_ids = self.resolve_scope(request)?;
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.model.clone());
        let key = QueryCache::key(request.backend, &request.scope, &model, question);

        let token = self.slot.begin();
        let started = Instant::now();

        let producer = {
            let backend = request.backend;
            let question = question.to_string();
            let model = model.clone();
            let scope_ids = scope_ids.clone();
            let vector = self.vector.clone();
            let vision = self.vision.clone();
            let timeout_secs = self.config.timeout_secs;

            move || async move {
                let fetch = async {
                    let raw = match backend {
                        RetrievalBackend::Vector => RawRetrieval::Vector(
                            vector
                                .search(&question, scope_ids.as_deref(), &model)
                                .await?,
                        ),
                        RetrievalBackend::Vision => {
                            let document_id =
                                scope_ids.as_ref().and_then(|ids| ids.first()).ok_or_else(
                                    || {
                                        TomeError::Validation(
                                            "Vision backend requires a specific document"
                                                .to_string(),
                                        )
                                    },
                                )?;
                            RawRetrieval::Vision(
                                vision.query(&question, document_id, &model).await?,
                            )
                        }
                    };

                    let sources = normalize(&raw);
                    let answer = match &raw {
                        RawRetrieval::Vector(response) => response.answer.clone(),
                        RawRetrieval::Vision(response) => match &response.reasoning {
                            Some(trace) if !trace.trim().is_empty() => {
                                format!("{}\n\nReasoning: {trace}", response.answer)
                            }
                            _ => response.answer.clone(),
                        },
                    };

                    Ok(RetrievalOutcome { answer, sources })
                };

                match tokio::time::timeout(Duration::from_secs(timeout_secs), fetch).await {
                    Ok(result) => result,
                    Err(_) => Err(TomeError::Timeout(timeout_secs)),
                }
            }
        };

        let (outcome, cache_hit) = tokio::select! {
            _ = token.cancelled() => return Err(TomeError::Cancelled),
            result = self.cache.get_or_fetch(&key, producer) => result?,
        };

        // The token may have been cancelled in the same poll the fetch
        // resolved; a superseded result must never reach the transcript.
        if token.is_cancelled() {
            return Err(TomeError::Cancelled);
        }

        let diagnostics = QueryDiagnostics {
            backend: request.backend,
            model,
            elapsed_ms: started.elapsed().as_millis() as u64,
            source_count: outcome.sources.len() as u32,
            cache_hit,
        };

        Ok(ChatExchange::answered(
            question.to_string(),
            outcome.answer.clone(),
            outcome.sources.clone(),
            diagnostics,
        ))
    }

    fn resolve_scope(&self, request: &QueryRequest) -> Result<Option<Vec<String>>> {
        match (&request.scope, request.backend) {
            (QueryScope::Document(id), _) => {
                let doc = self
                    .documents
                    .get(id)
                    .ok_or_else(|| TomeError::NotFound(format!("Document {id} not found")))?;
                if !doc.is_ready() {
                    return Err(TomeError::Validation(format!(
                        "Document {id} is {} and cannot be queried",
                        doc.status
                    )));
                }
                Ok(Some(vec![id.clone()]))
            }
            (QueryScope::AllDocuments, RetrievalBackend::Vision) => Err(TomeError::Validation(
                "Vision backend requires a specific document".to_string(),
            )),
            (QueryScope::AllDocuments, RetrievalBackend::Vector) => {
                if self.documents.ready_ids().is_empty() {
                    return Err(TomeError::Validation(
                        "No ready documents to query".to_string(),
                    ));
                }
                Ok(None)
            }
        }
    }
}
