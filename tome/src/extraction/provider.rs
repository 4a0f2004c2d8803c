use std::time::Duration;

use crate::config::ExtractionConfig;
use crate::error::{Result, TomeError};

use super::api::{CrawlClient, ExtractedText, OcrClient};

/// Routes extraction to the OCR or crawl endpoint by input kind and bounds
/// every call with the configured timeout.
#[derive(Clone)]
pub struct ExtractionProvider {
    ocr: OcrClient,
    crawl: CrawlClient,
    config: ExtractionConfig,
}

impl ExtractionProvider {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            ocr: OcrClient::new(config)?,
            crawl: CrawlClient::new(config)?,
            config: config.clone(),
        })
    }

    pub fn ocr_model(&self) -> &str {
        &self.config.ocr_model
    }

    pub fn crawl_model(&self) -> &str {
        &self.config.crawl_model
    }

    pub async fn extract_file(&self, document_id: &str, bytes: &[u8]) -> Result<ExtractedText> {
        self.bounded(self.ocr.extract(document_id, bytes)).await
    }

    pub async fn extract_url(&self, document_id: &str, url: &str) -> Result<ExtractedText> {
        self.bounded(self.crawl.extract(document_id, url)).await
    }

    async fn bounded<F>(&self, fut: F) -> Result<ExtractedText>
    where
        F: std::future::Future<Output = Result<ExtractedText>>,
    {
        let timeout_secs = self.config.timeout_secs;
        match tokio::time::timeout(Duration::from_secs(timeout_secs), fut).await {
            Ok(result) => result,
            Err(_) => Err(TomeError::Timeout(timeout_secs)),
        }
    }
}
