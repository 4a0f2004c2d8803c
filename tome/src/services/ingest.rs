use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::embeddings::EmbeddingProvider;
use crate::error::{Result, TomeError};
use crate::extraction::ExtractionProvider;
use crate::models::{ChatExchange, Document, DocumentOrigin, IngestReceipt};
use crate::session::{DocumentStore, Transcript};

/// Pipeline step at which an ingestion failed, surfaced in the failure
/// message so the operator knows which external dependency to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStep {
    Extract,
    Register,
    Embed,
}

impl std::fmt::Display for IngestStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extract => write!(f, "extraction"),
            Self::Register => write!(f, "record creation"),
            Self::Embed => write!(f, "embedding"),
        }
    }
}

enum IngestInput {
    FileBytes(Vec<u8>),
    Url(String),
}

/// Drives each document through extract → register → embed.
///
/// The document is registered as `processing` before the first external
/// call, so it is visible to the UI immediately. Concurrent ingestions run
/// as independent tasks and may complete in any order; every document's
/// state transition stands alone. No step is retried automatically.
#[derive(Clone)]
pub struct IngestPipeline {
    documents: DocumentStore,
    transcript: Transcript,
    extraction: ExtractionProvider,
    embeddings: EmbeddingProvider,
    shutdown: CancellationToken,
}

impl IngestPipeline {
    pub fn new(
        documents: DocumentStore,
        transcript: Transcript,
        extraction: ExtractionProvider,
        embeddings: EmbeddingProvider,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            documents,
            transcript,
            extraction,
            embeddings,
            shutdown,
        }
    }

    pub fn ingest_file(&self, name: String, bytes: Vec<u8>) -> Result<IngestReceipt> {
        if bytes.is_empty() {
            return Err(TomeError::Validation("Uploaded file is empty".to_string()));
        }
        let name = if name.trim().is_empty() {
            "untitled".to_string()
        } else {
            name
        };

        let receipt = self.register(name, DocumentOrigin::File);
        self.spawn(receipt.id.clone(), IngestInput::FileBytes(bytes));
        Ok(receipt)
    }

    pub fn ingest_url(&self, url: String) -> Result<IngestReceipt> {
        let parsed = url::Url::parse(&url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TomeError::Validation(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        let receipt = self.register(url.clone(), DocumentOrigin::Url);
        self.spawn(receipt.id.clone(), IngestInput::Url(url));
        Ok(receipt)
    }

    fn register(&self, name: String, origin: DocumentOrigin) -> IngestReceipt {
        let mut doc = Document::new(Uuid::new_v4().to_string(), name, origin);
        doc.extraction_provider = match origin {
            DocumentOrigin::File => self.extraction.ocr_model().to_string(),
            DocumentOrigin::Url => self.extraction.crawl_model().to_string(),
        };
        doc.embedding_provider = self.embeddings.model().to_string();

        let receipt = IngestReceipt {
            id: doc.id.clone(),
            status: doc.status,
        };
        self.documents.insert(doc);
        receipt
    }

    fn spawn(&self, id: String, input: IngestInput) {
        let pipeline = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = pipeline.shutdown.cancelled() => {
                    tracing::debug!(doc_id = %id, "Ingestion cancelled by shutdown");
                }
                result = pipeline.process(&id, input) => {
                    if let Err(e) = result {
                        tracing::error!(doc_id = %id, error = %e, "Ingestion failed");
                    }
                }
            }
        });
    }

    async fn process(&self, id: &str, input: IngestInput) -> Result<()> {
        let doc = self
            .documents
            .get(id)
            .ok_or_else(|| TomeError::NotFound(format!("Document {id} not found")))?;

        let extracted = match &input {
            IngestInput::FileBytes(bytes) => self.extraction.extract_file(id, bytes).await,
            IngestInput::Url(url) => self.extraction.extract_url(id, url).await,
        };
        let extracted = match extracted {
            Ok(extracted) => extracted,
            Err(e) => return self.fail(id, &doc.name, IngestStep::Extract, e),
        };

        let record_id = match self.embeddings.register_document(&doc).await {
            Ok(record_id) => record_id,
            Err(e) => return self.fail(id, &doc.name, IngestStep::Register, e),
        };
        tracing::debug!(doc_id = %id, record_id = %record_id, "Document record created");

        let receipt = match self.embeddings.embed_document(id, &extracted.text).await {
            Ok(receipt) => receipt,
            Err(e) => return self.fail(id, &doc.name, IngestStep::Embed, e),
        };

        self.documents
            .mark_ready(id, receipt.chunk_count, receipt.embeddings_generated)?;
        tracing::info!(
            doc_id = %id,
            chunk_count = receipt.chunk_count,
            embeddings_generated = receipt.embeddings_generated,
            "Document ready"
        );
        Ok(())
    }

    fn fail(&self, id: &str, name: &str, step: IngestStep, error: TomeError) -> Result<()> {
        let message = format!("{step} failed: {error}");
        if let Err(e) = self.documents.mark_failed(id, &message) {
            tracing::warn!(doc_id = %id, error = %e, "Could not record ingestion failure");
        }
        self.transcript.append(ChatExchange::notice(format!(
            "Ingestion of \"{name}\" failed during {step}: {error}"
        )));
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_names_distinguish_dependencies() {
        assert_eq!(IngestStep::Extract.to_string(), "extraction");
        assert_eq!(IngestStep::Register.to_string(), "record creation");
        assert_eq!(IngestStep::Embed.to_string(), "embedding");
    }
}
