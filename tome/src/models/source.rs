use serde::{Deserialize, Serialize};

/// Similarity assigned to sources from backends that have no comparable
/// score (vision page reasoning). Signals "always relevant" rather than a
/// measured value; only ever compared within a single query's result set.
pub const SENTINEL_SIMILARITY: f32 = 1.0;

/// Structured position of a source within its document.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SourceLocator {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Canonical unit of evidence returned by any retrieval backend.
///
/// `similarity` is always in `0..=1` and comparable across sources from
/// the same query; it is not comparable across backends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalSource {
    pub text: String,
    pub similarity: f32,
    pub origin_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator: Option<SourceLocator>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_omits_absent_fields_on_wire() {
        let source = RetrievalSource {
            text: "passage".to_string(),
            similarity: 0.42,
            origin_label: "report.pdf".to_string(),
            locator: Some(SourceLocator {
                page: None,
                chunk_index: Some(3),
                link: None,
            }),
        };
        let json = serde_json::to_value(&source).unwrap();
        assert_eq!(json["locator"]["chunk_index"], 3);
        assert!(json["locator"].get("page").is_none());
        assert!(json["locator"].get("link").is_none());
    }

    #[test]
    fn test_source_without_locator_omits_it() {
        let source = RetrievalSource {
            text: String::new(),
            similarity: SENTINEL_SIMILARITY,
            origin_label: "pages 1-3".to_string(),
            locator: None,
        };
        let json = serde_json::to_value(&source).unwrap();
        assert!(json.get("locator").is_none());
        assert_eq!(json["similarity"], 1.0);
    }
}
