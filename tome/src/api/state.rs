use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::embeddings::EmbeddingProvider;
use crate::extraction::ExtractionProvider;
use crate::retrieval::{VectorSearchClient, VisionQueryClient};
use crate::services::{IngestPipeline, QueryService};
use crate::session::{DocumentStore, Transcript};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub documents: DocumentStore,
    pub transcript: Transcript,
    pub ingest: IngestPipeline,
    pub query: QueryService,
}

impl AppState {
    pub fn new(
        config: Config,
        extraction: ExtractionProvider,
        embeddings: EmbeddingProvider,
        vector: VectorSearchClient,
        vision: VisionQueryClient,
        shutdown: CancellationToken,
    ) -> Self {
        let config = Arc::new(config);
        let documents = DocumentStore::new();
        let transcript = Transcript::new();

        let ingest = IngestPipeline::new(
            documents.clone(),
            transcript.clone(),
            extraction,
            embeddings,
            shutdown.child_token(),
        );
        let query = QueryService::new(
            documents.clone(),
            transcript.clone(),
            vector,
            vision,
            &config.retrieval,
            shutdown.child_token(),
        );

        Self {
            config,
            documents,
            transcript,
            ingest,
            query,
        }
    }
}
