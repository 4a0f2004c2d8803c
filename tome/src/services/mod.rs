mod ingest;
mod query;

pub use ingest::{IngestPipeline, IngestStep};
pub use query::{QueryRequest, QueryService};
