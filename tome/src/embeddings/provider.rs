use std::time::Duration;

use crate::config::EmbeddingsConfig;
use crate::error::{Result, TomeError};
use crate::models::Document;

use super::api::{EmbeddingReceipt, IndexClient};

/// Wraps the index client with the configured per-call timeout.
#[derive(Clone)]
pub struct EmbeddingProvider {
    client: IndexClient,
    config: EmbeddingsConfig,
}

impl EmbeddingProvider {
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        Ok(Self {
            client: IndexClient::new(config)?,
            config: config.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub async fn register_document(&self, doc: &Document) -> Result<String> {
        let timeout_secs = self.config.timeout_secs;
        match tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            self.client.create_record(doc),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(TomeError::Timeout(timeout_secs)),
        }
    }

    pub async fn embed_document(&self, document_id: &str, text: &str) -> Result<EmbeddingReceipt> {
        let timeout_secs = self.config.timeout_secs;
        match tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            self.client.generate_embeddings(document_id, text),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(TomeError::Timeout(timeout_secs)),
        }
    }
}
