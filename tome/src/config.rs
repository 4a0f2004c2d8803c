use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Splits a `provider/model` selector into its two halves.
///
/// `"mistral/mistral-ocr-latest"` → `("mistral", "mistral-ocr-latest")`.
/// A bare model name is treated as belonging to the `local` provider.
pub fn parse_provider_model(model: &str) -> (&str, &str) {
    match model.split_once('/') {
        Some((provider, name)) => (provider, name),
        None => ("local", model),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub extraction: ExtractionConfig,
    pub embeddings: EmbeddingsConfig,
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_keys: Vec<String>,
}

/// External OCR/crawl service used to turn uploads and URLs into plain text.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    pub ocr_model: String,
    pub crawl_model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

/// External index service that persists document records and generates
/// chunk embeddings.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Retrieval backends answering questions over ready documents.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub top_k: usize,
    // Identical queries within this window reuse the cached answer
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("TOME_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("TOME_PORT", 3000),
                api_keys: env::var("TOME_API_KEYS")
                    .map(|keys| keys.split(',').map(|s| s.trim().to_string()).collect())
                    .unwrap_or_default(),
            },
            extraction: ExtractionConfig {
                ocr_model: env::var("EXTRACTION_OCR_MODEL")
                    .unwrap_or_else(|_| "mistral/mistral-ocr-latest".to_string()),
                crawl_model: env::var("EXTRACTION_CRAWL_MODEL")
                    .unwrap_or_else(|_| "local/crawler".to_string()),
                api_key: env::var("EXTRACTION_API_KEY").ok(),
                base_url: env::var("EXTRACTION_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:7050".to_string()),
                timeout_secs: parse_env_or("EXTRACTION_TIMEOUT_SECS", 120),
            },
            embeddings: EmbeddingsConfig {
                model: env::var("EMBEDDINGS_MODEL")
                    .unwrap_or_else(|_| "local/bge-small-en-v1.5".to_string()),
                api_key: env::var("EMBEDDINGS_API_KEY").ok(),
                base_url: env::var("EMBEDDINGS_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:7060".to_string()),
                timeout_secs: parse_env_or("EMBEDDINGS_TIMEOUT_SECS", 60),
            },
            retrieval: RetrievalConfig {
                model: env::var("RETRIEVAL_MODEL")
                    .unwrap_or_else(|_| "openai/gpt-4o-mini".to_string()),
                api_key: env::var("RETRIEVAL_API_KEY").ok(),
                base_url: env::var("RETRIEVAL_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:7070".to_string()),
                timeout_secs: parse_env_or("RETRIEVAL_TIMEOUT_SECS", 60),
                top_k: parse_env_or("RETRIEVAL_TOP_K", 8),
                cache_ttl_secs: parse_env_or("RETRIEVAL_CACHE_TTL_SECS", 300),
                cache_capacity: parse_env_or("RETRIEVAL_CACHE_CAPACITY", 64),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
