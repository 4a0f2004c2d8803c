use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::RetrievalConfig;
use crate::error::{Result, TomeError};

/// Raw response of either retrieval backend, tagged so the normalizer is
/// the single place that understands provider shapes.
#[derive(Debug)]
pub enum RawRetrieval {
    Vector(VectorResponse),
    Vision(VisionResponse),
}

#[derive(Debug, Deserialize)]
pub struct VectorResponse {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<VectorHit>,
}

#[derive(Debug, Deserialize)]
pub struct VectorHit {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub chunk_index: u32,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VisionResponse {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub pages: Vec<VisionPageGroup>,
}

#[derive(Debug, Deserialize)]
pub struct VisionPageGroup {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub page_start: u32,
    #[serde(default)]
    pub page_end: u32,
}

#[derive(Debug, Serialize)]
struct VectorSearchRequest<'a> {
    q: &'a str,
    /// `"all"` or `"documents"`; `document_ids` is present for the latter.
    scope: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    document_ids: Option<&'a [String]>,
    model: &'a str,
    top_k: usize,
}

#[derive(Debug, Serialize)]
struct VisionQueryRequest<'a> {
    prompt: &'a str,
    document_id: &'a str,
    model: &'a str,
}

/// Passage-level similarity search over embedded chunks.
#[derive(Clone, Debug)]
pub struct VectorSearchClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    top_k: usize,
}

impl VectorSearchClient {
    pub fn new(config: &RetrievalConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TomeError::Retrieval(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            top_k: config.top_k,
        })
    }

    pub async fn search(
        &self,
        question: &str,
        document_ids: Option<&[String]>,
        model: &str,
    ) -> Result<VectorResponse> {
        let request = VectorSearchRequest {
            q: question,
            scope: if document_ids.is_some() {
                "documents"
            } else {
                "all"
            },
            document_ids,
            model,
            top_k: self.top_k,
        };

        let mut builder = self
            .client
            .post(format!("{}/v1/search", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(TomeError::from_response(response).await);
        }

        response
            .json::<VectorResponse>()
            .await
            .map_err(|e| TomeError::Retrieval(format!("Failed to parse search response: {e}")))
    }
}

/// Whole-document reasoning over rendered pages. Only ever queried with a
/// single specific document.
#[derive(Clone, Debug)]
pub struct VisionQueryClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl VisionQueryClient {
    pub fn new(config: &RetrievalConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TomeError::Retrieval(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        })
    }

    pub async fn query(
        &self,
        question: &str,
        document_id: &str,
        model: &str,
    ) -> Result<VisionResponse> {
        let request = VisionQueryRequest {
            prompt: question,
            document_id,
            model,
        };

        let mut builder = self
            .client
            .post(format!("{}/v1/vision/query", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(TomeError::from_response(response).await);
        }

        response
            .json::<VisionResponse>()
            .await
            .map_err(|e| TomeError::Retrieval(format!("Failed to parse vision response: {e}")))
    }
}
