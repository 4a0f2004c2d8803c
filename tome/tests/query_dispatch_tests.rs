//! Query dispatch integration tests.
//!
//! The retrieval backends are stood in by a wiremock server, so these
//! tests verify cache de-duplication by counting real HTTP calls, the
//! pre-network validation of vision scope, cancellation semantics, and
//! normalization of both provider shapes.

use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tome::config::RetrievalConfig;
use tome::error::TomeError;
use tome::models::{Document, DocumentOrigin, QueryScope, RetrievalBackend};
use tome::retrieval::{VectorSearchClient, VisionQueryClient};
use tome::services::{QueryRequest, QueryService};
use tome::session::{DocumentStore, Transcript};

fn retrieval_config(base_url: &str) -> RetrievalConfig {
    RetrievalConfig {
        model: "openai/gpt-4o-mini".to_string(),
        api_key: Some("test-retrieval-key".to_string()),
        base_url: base_url.to_string(),
        timeout_secs: 5,
        top_k: 8,
        cache_ttl_secs: 300,
        cache_capacity: 16,
    }
}

fn ready_store(ids: &[&str]) -> DocumentStore {
    let store = DocumentStore::new();
    for id in ids {
        store.insert(Document::new(
            id.to_string(),
            format!("{id}.pdf"),
            DocumentOrigin::File,
        ));
        store.mark_ready(id, 3, true).unwrap();
    }
    store
}

fn build_service(base_url: &str, store: DocumentStore) -> (QueryService, Transcript) {
    let transcript = Transcript::new();
    let config = retrieval_config(base_url);
    let service = QueryService::new(
        store,
        transcript.clone(),
        VectorSearchClient::new(&config).unwrap(),
        VisionQueryClient::new(&config).unwrap(),
        &config,
        CancellationToken::new(),
    );
    (service, transcript)
}

fn vector_request(question: &str) -> QueryRequest {
    QueryRequest {
        question: question.to_string(),
        scope: QueryScope::AllDocuments,
        backend: RetrievalBackend::Vector,
        model: None,
    }
}

#[tokio::test]
async fn test_identical_queries_within_ttl_hit_backend_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "answer": "X is Y.",
            "sources": [
                {"text": "passage", "score": 0.9, "filename": "doc.pdf", "chunk_index": 1}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (service, transcript) = build_service(&server.uri(), ready_store(&["d1"]));

    let first = service.query(vector_request("What is X?")).await.unwrap();
    let second = service.query(vector_request("What is X?")).await.unwrap();

    assert_eq!(first.answer, "X is Y.");
    assert_eq!(second.answer, "X is Y.");
    assert!(!first.diagnostics.as_ref().unwrap().cache_hit);
    assert!(second.diagnostics.as_ref().unwrap().cache_hit);

    // Both turns still land in the transcript, in submission order.
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript.list()[0].question, "What is X?");
}

#[tokio::test]
async fn test_different_questions_fetch_separately() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"answer": "answer", "sources": []})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let (service, _transcript) = build_service(&server.uri(), ready_store(&["d1"]));

    service.query(vector_request("What is X?")).await.unwrap();
    service.query(vector_request("What is Y?")).await.unwrap();
}

#[tokio::test]
async fn test_vision_with_all_documents_scope_never_reaches_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/vision/query"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (service, transcript) = build_service(&server.uri(), ready_store(&["d1"]));

    let result = service
        .query(QueryRequest {
            question: "What is on page 3?".to_string(),
            scope: QueryScope::AllDocuments,
            backend: RetrievalBackend::Vision,
            model: None,
        })
        .await;

    assert!(matches!(result, Err(TomeError::Validation(_))));
    assert!(transcript.is_empty());
}

#[tokio::test]
async fn test_vision_query_appends_reasoning_and_sentinel_sources() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/vision/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "answer": "The chart shows a decline.",
            "reasoning": "Pages 2-4 contain the revenue chart.",
            "pages": [
                {"title": "Revenue", "summary": "Quarterly decline", "page_start": 2, "page_end": 4}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (service, _transcript) = build_service(&server.uri(), ready_store(&["d1"]));

    let exchange = service
        .query(QueryRequest {
            question: "What does the chart show?".to_string(),
            scope: QueryScope::Document("d1".to_string()),
            backend: RetrievalBackend::Vision,
            model: None,
        })
        .await
        .unwrap();

    assert!(exchange.answer.contains("The chart shows a decline."));
    assert!(exchange.answer.contains("Pages 2-4 contain the revenue chart."));
    assert_eq!(exchange.sources.len(), 1);
    assert_eq!(exchange.sources[0].similarity, 1.0);
    assert_eq!(exchange.sources[0].origin_label, "pages 2-4");
}

#[tokio::test]
async fn test_provider_failure_appends_error_exchange_and_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(serde_json::json!({"error": "overloaded"})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let (service, transcript) = build_service(&server.uri(), ready_store(&["d1"]));

    let first = service.query(vector_request("What is X?")).await.unwrap();
    assert!(first.answer.contains("overloaded"), "got: {}", first.answer);
    assert!(first.sources.is_empty());

    // A failed fetch must not poison the cache; the retry reaches the
    // backend again.
    let second = service.query(vector_request("What is X?")).await.unwrap();
    assert!(second.answer.contains("overloaded"));

    assert_eq!(transcript.len(), 2);
}

#[tokio::test]
async fn test_superseded_query_is_cancelled_and_never_appended() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"answer": "slow answer", "sources": []}))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;

    let (service, transcript) = build_service(&server.uri(), ready_store(&["d1"]));

    let first = {
        let service = service.clone();
        tokio::spawn(async move { service.query(vector_request("first question")).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = service.query(vector_request("second question")).await;

    let first = first.await.unwrap();
    assert!(matches!(first, Err(TomeError::Cancelled)));
    assert!(second.is_ok());

    // Even though the backend would eventually have answered the first
    // question, only the superseding turn exists in the transcript.
    let listed = transcript.list();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].question, "second question");
}

#[tokio::test]
async fn test_cancel_current_prevents_resolution() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"answer": "answer", "sources": []}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let (service, transcript) = build_service(&server.uri(), ready_store(&["d1"]));

    let handle = {
        let service = service.clone();
        tokio::spawn(async move { service.query(vector_request("What is X?")).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    service.cancel_current();

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(TomeError::Cancelled)));
    assert!(transcript.is_empty());
}

#[tokio::test]
async fn test_out_of_range_scores_are_normalized_into_unit_range() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "answer": "answer",
            "sources": [
                {"text": "a", "score": 7.5, "filename": "doc.pdf", "chunk_index": 0},
                {"text": "b", "score": -1.0, "filename": "doc.pdf", "chunk_index": 1},
                {"text": "c", "score": 0.4, "filename": "doc.pdf", "chunk_index": 2}
            ]
        })))
        .mount(&server)
        .await;

    let (service, _transcript) = build_service(&server.uri(), ready_store(&["d1"]));

    let exchange = service.query(vector_request("What is X?")).await.unwrap();
    assert_eq!(exchange.sources.len(), 3);
    for source in &exchange.sources {
        assert!(
            (0.0..=1.0).contains(&source.similarity),
            "similarity {} out of range",
            source.similarity
        );
    }
}

#[tokio::test]
async fn test_single_document_scope_restricts_search() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .and(wiremock::matchers::body_partial_json(
            serde_json::json!({"scope": "documents", "document_ids": ["d2"]}),
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"answer": "scoped", "sources": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (service, _transcript) = build_service(&server.uri(), ready_store(&["d1", "d2"]));

    let exchange = service
        .query(QueryRequest {
            question: "What is X?".to_string(),
            scope: QueryScope::Document("d2".to_string()),
            backend: RetrievalBackend::Vector,
            model: None,
        })
        .await
        .unwrap();

    assert_eq!(exchange.answer, "scoped");
}
