use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::EmbeddingsConfig;
use crate::error::{Result, TomeError};
use crate::models::Document;

/// What the index service reports after chunking and embedding a
/// document's extracted text.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EmbeddingReceipt {
    #[serde(default)]
    pub chunk_count: u32,
    #[serde(default)]
    pub embeddings_generated: bool,
}

#[derive(Debug, Serialize)]
struct CreateRecordRequest<'a> {
    document_id: &'a str,
    name: &'a str,
    origin: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateRecordResponse {
    #[serde(default)]
    record_id: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    document_id: &'a str,
    text: &'a str,
    model: &'a str,
}

/// Client for the external index service: persists document records and
/// generates chunk embeddings from extracted text.
#[derive(Clone, Debug)]
pub struct IndexClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl IndexClient {
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TomeError::Embedding(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        })
    }

    /// Persists the document record the embeddings will attach to. The raw
    /// extracted text itself is never stored here.
    pub async fn create_record(&self, doc: &Document) -> Result<String> {
        let origin = doc.origin.to_string();
        let request = CreateRecordRequest {
            document_id: &doc.id,
            name: &doc.name,
            origin: &origin,
        };

        let mut builder = self
            .client
            .post(format!("{}/v1/records", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(TomeError::from_response(response).await);
        }

        let parsed: CreateRecordResponse = response
            .json()
            .await
            .map_err(|e| TomeError::Embedding(format!("Failed to parse record response: {e}")))?;
        Ok(parsed.record_id)
    }

    pub async fn generate_embeddings(
        &self,
        document_id: &str,
        text: &str,
    ) -> Result<EmbeddingReceipt> {
        let request = EmbeddingRequest {
            document_id,
            text,
            model: &self.model,
        };

        let mut builder = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(TomeError::from_response(response).await);
        }

        response
            .json::<EmbeddingReceipt>()
            .await
            .map_err(|e| TomeError::Embedding(format!("Failed to parse embedding response: {e}")))
    }
}
