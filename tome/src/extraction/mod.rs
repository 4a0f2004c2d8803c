mod api;
mod provider;

pub use api::{CrawlClient, ExtractedText, OcrClient};
pub use provider::ExtractionProvider;
