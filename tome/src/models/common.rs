use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentOrigin {
    File,
    Url,
}

impl std::fmt::Display for DocumentOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Url => write!(f, "url"),
        }
    }
}

impl std::str::FromStr for DocumentOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "url" => Ok(Self::Url),
            _ => Err(format!("Unknown document origin: {s}")),
        }
    }
}

/// Lifecycle state of one ingested document.
///
/// `Ready` and `Failed` are terminal; a document never leaves either
/// without being re-ingested under a brand-new id.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Processing,
    Ready,
    Failed,
}

impl DocumentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Processing => write!(f, "processing"),
            Self::Ready => write!(f, "ready"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "processing" => Ok(Self::Processing),
            "ready" => Ok(Self::Ready),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Unknown document status: {s}")),
        }
    }
}

/// Retrieval strategy used to answer a question.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalBackend {
    /// Vector-similarity search over passage chunks. Supports any scope.
    #[default]
    Vector,
    /// Vision reasoning over one document's rendered pages. Requires a
    /// single specific document.
    Vision,
}

impl std::fmt::Display for RetrievalBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vector => write!(f, "vector"),
            Self::Vision => write!(f, "vision"),
        }
    }
}

impl std::str::FromStr for RetrievalBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vector" => Ok(Self::Vector),
            "vision" => Ok(Self::Vision),
            _ => Err(format!("Unknown retrieval backend: {s}")),
        }
    }
}

/// Which documents a query searches against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryScope {
    /// All documents currently in `ready` state.
    AllDocuments,
    /// One specific document by id.
    Document(String),
}

impl QueryScope {
    /// Stable label used as part of the query cache key.
    pub fn cache_label(&self) -> String {
        match self {
            Self::AllDocuments => "all".to_string(),
            Self::Document(id) => format!("doc:{id}"),
        }
    }
}
