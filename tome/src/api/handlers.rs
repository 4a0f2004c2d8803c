//! HTTP handlers. All responses are wrapped in [`ApiResponse`] envelopes.

use axum::extract::{Multipart, Path, State};
use validator::Validate;

use crate::api::dto::{ChatQueryRequest, HealthResponse, IngestUrlRequest};
use crate::api::response::{ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::models::{ChatExchange, Document, DocumentSummary, IngestReceipt};
use crate::retrieval::{summarize, SourceStats};
use crate::services::QueryRequest;

/// `GET /api/v1/health`
pub async fn health(State(state): State<AppState>) -> ApiResponse<HealthResponse> {
    ApiResponse::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        documents: state.documents.list().len(),
        exchanges: state.transcript.len(),
    })
}

/// `POST /api/v1/documents/file`
///
/// Accepts a multipart upload and queues it for async ingestion. Returns
/// 202 with the new document id; progress is visible via the document list.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResponse<IngestReceipt> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            if let Some(name) = field.file_name() {
                file_name = Some(name.to_string());
            }
            match field.bytes().await {
                Ok(bytes) => file_bytes = Some(bytes.to_vec()),
                Err(e) => {
                    return ApiResponse::error(
                        ErrorCode::InvalidRequest,
                        format!("Failed to read uploaded file: {e}"),
                    );
                }
            }
        }
    }

    let Some(bytes) = file_bytes else {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Missing 'file' field");
    };

    match state
        .ingest
        .ingest_file(file_name.unwrap_or_else(|| "untitled".to_string()), bytes)
    {
        Ok(receipt) => ApiResponse::accepted(receipt),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/documents/url`
pub async fn ingest_url(
    State(state): State<AppState>,
    axum::Json(req): axum::Json<IngestUrlRequest>,
) -> ApiResponse<IngestReceipt> {
    if let Err(e) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, e.to_string());
    }

    match state.ingest.ingest_url(req.url) {
        Ok(receipt) => ApiResponse::accepted(receipt),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/documents`
pub async fn list_documents(State(state): State<AppState>) -> ApiResponse<Vec<DocumentSummary>> {
    ApiResponse::success(state.documents.list())
}

/// `GET /api/v1/documents/{documentId}`
pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> ApiResponse<Document> {
    match state.documents.get(&document_id) {
        Some(doc) => ApiResponse::success(doc),
        None => ApiResponse::error(
            ErrorCode::NotFound,
            format!("Document {document_id} not found"),
        ),
    }
}

/// `DELETE /api/v1/documents/{documentId}`
///
/// Pure list removal; nothing is deleted remotely.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> ApiResponse<()> {
    if state.documents.remove(&document_id) {
        ApiResponse::success(())
    } else {
        ApiResponse::error(
            ErrorCode::NotFound,
            format!("Document {document_id} not found"),
        )
    }
}

/// `POST /api/v1/chat/query`
///
/// Resolves a question against the chosen backend. A query superseded by a
/// newer one returns an empty envelope rather than an error.
pub async fn chat_query(
    State(state): State<AppState>,
    axum::Json(req): axum::Json<ChatQueryRequest>,
) -> ApiResponse<Option<ChatExchange>> {
    if let Err(e) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, e.to_string());
    }

    let request = QueryRequest {
        question: req.question.clone(),
        scope: req.scope(),
        backend: req.backend,
        model: req.model.clone(),
    };

    match state.query.query(request).await {
        Ok(exchange) => ApiResponse::success(Some(exchange)),
        Err(e) if e.is_cancelled() => ApiResponse::success(None),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/chat`
pub async fn get_transcript(State(state): State<AppState>) -> ApiResponse<Vec<ChatExchange>> {
    ApiResponse::success(state.transcript.list())
}

/// `GET /api/v1/chat/{exchangeId}/stats`
///
/// Similarity-bucket diagnostics recomputed from the exchange's stored
/// sources.
pub async fn exchange_stats(
    State(state): State<AppState>,
    Path(exchange_id): Path<String>,
) -> ApiResponse<SourceStats> {
    match state.transcript.get(&exchange_id) {
        Some(exchange) => ApiResponse::success(summarize(&exchange.sources)),
        None => ApiResponse::error(
            ErrorCode::NotFound,
            format!("Exchange {exchange_id} not found"),
        ),
    }
}
