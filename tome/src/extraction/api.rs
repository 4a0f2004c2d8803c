use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ExtractionConfig;
use crate::error::{Result, TomeError};

/// Plain text produced by the extraction service, with optional page and
/// confidence metadata for OCR sources.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedText {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub confidence: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OcrRequest<'a> {
    document_id: &'a str,
    /// Base64-encoded file bytes.
    payload: String,
    model: &'a str,
}

#[derive(Debug, Serialize)]
struct CrawlRequest<'a> {
    document_id: &'a str,
    url: &'a str,
    model: &'a str,
}

#[derive(Clone, Debug)]
pub struct OcrClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OcrClient {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TomeError::Extraction(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.ocr_model.clone(),
        })
    }

    /// Sends file bytes as a base64 payload and returns the extracted text.
    pub async fn extract(&self, document_id: &str, bytes: &[u8]) -> Result<ExtractedText> {
        let request = OcrRequest {
            document_id,
            payload: STANDARD.encode(bytes),
            model: &self.model,
        };

        let mut builder = self
            .client
            .post(format!("{}/v1/ocr", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(TomeError::from_response(response).await);
        }

        response
            .json::<ExtractedText>()
            .await
            .map_err(|e| TomeError::Extraction(format!("Failed to parse OCR response: {e}")))
    }
}

#[derive(Clone, Debug)]
pub struct CrawlClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl CrawlClient {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TomeError::Extraction(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.crawl_model.clone(),
        })
    }

    pub async fn extract(&self, document_id: &str, url: &str) -> Result<ExtractedText> {
        let request = CrawlRequest {
            document_id,
            url,
            model: &self.model,
        };

        let mut builder = self
            .client
            .post(format!("{}/v1/crawl", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(TomeError::from_response(response).await);
        }

        response
            .json::<ExtractedText>()
            .await
            .map_err(|e| TomeError::Extraction(format!("Failed to parse crawl response: {e}")))
    }
}
