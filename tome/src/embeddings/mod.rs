mod api;
mod provider;

pub use api::{EmbeddingReceipt, IndexClient};
pub use provider::EmbeddingProvider;
