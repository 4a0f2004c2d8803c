mod api;
mod cache;
mod cancel;
mod diagnostics;
mod normalize;

pub use api::{
    RawRetrieval, VectorHit, VectorResponse, VectorSearchClient, VisionPageGroup, VisionQueryClient,
    VisionResponse,
};
pub use cache::{QueryCache, RetrievalOutcome};
pub use cancel::QuerySlot;
pub use diagnostics::{summarize, SimilarityBuckets, SourceStats};
pub use normalize::normalize;
