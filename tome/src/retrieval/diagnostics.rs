use serde::{Deserialize, Serialize};

use crate::models::RetrievalSource;

/// Counts of sources per similarity band, for the debug/visualization
/// surfaces. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SimilarityBuckets {
    /// similarity >= 0.8
    pub high: u32,
    /// 0.6 <= similarity < 0.8
    pub good: u32,
    /// 0.4 <= similarity < 0.6
    pub moderate: u32,
    /// similarity < 0.4
    pub low: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceStats {
    pub buckets: SimilarityBuckets,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_rank: Option<f32>,
    pub total_considered: u32,
}

/// Pure aggregation over one query's sources. Sources from different
/// queries are never mixed here, so scores stay comparable.
pub fn summarize(sources: &[RetrievalSource]) -> SourceStats {
    let mut buckets = SimilarityBuckets::default();
    let mut top_rank: Option<f32> = None;

    for source in sources {
        let similarity = source.similarity;
        if similarity >= 0.8 {
            buckets.high += 1;
        } else if similarity >= 0.6 {
            buckets.good += 1;
        } else if similarity >= 0.4 {
            buckets.moderate += 1;
        } else {
            buckets.low += 1;
        }

        top_rank = Some(match top_rank {
            Some(best) if best >= similarity => best,
            _ => similarity,
        });
    }

    SourceStats {
        buckets,
        top_rank,
        total_considered: sources.len() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SENTINEL_SIMILARITY;

    fn source(similarity: f32) -> RetrievalSource {
        RetrievalSource {
            text: String::new(),
            similarity,
            origin_label: String::new(),
            locator: None,
        }
    }

    #[test]
    fn test_bucket_counts_match_bands() {
        let sources = [source(0.9), source(0.65), source(0.3)];
        let stats = summarize(&sources);

        assert_eq!(stats.buckets.high, 1);
        assert_eq!(stats.buckets.good, 1);
        assert_eq!(stats.buckets.moderate, 0);
        assert_eq!(stats.buckets.low, 1);
        assert_eq!(stats.total_considered, 3);
    }

    #[test]
    fn test_band_boundaries_are_inclusive_lower() {
        let stats = summarize(&[source(0.8), source(0.6), source(0.4)]);
        assert_eq!(stats.buckets.high, 1);
        assert_eq!(stats.buckets.good, 1);
        assert_eq!(stats.buckets.moderate, 1);
        assert_eq!(stats.buckets.low, 0);
    }

    #[test]
    fn test_top_rank_is_highest_similarity() {
        let stats = summarize(&[source(0.2), source(0.7), source(0.5)]);
        assert_eq!(stats.top_rank, Some(0.7));
    }

    #[test]
    fn test_empty_sources_have_no_top_rank() {
        let stats = summarize(&[]);
        assert_eq!(stats.top_rank, None);
        assert_eq!(stats.total_considered, 0);
        assert_eq!(stats.buckets, SimilarityBuckets::default());
    }

    #[test]
    fn test_sentinel_sources_count_as_high() {
        let stats = summarize(&[source(SENTINEL_SIMILARITY), source(SENTINEL_SIMILARITY)]);
        assert_eq!(stats.buckets.high, 2);
        assert_eq!(stats.top_rank, Some(1.0));
    }
}
