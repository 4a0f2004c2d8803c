use crate::models::{RetrievalSource, SourceLocator, SENTINEL_SIMILARITY};

use super::api::RawRetrieval;

/// Converts either backend's raw response into canonical sources.
///
/// Downstream code never branches on provider identity; this is the only
/// place that understands the two wire shapes. Missing fields have already
/// been defaulted to empty/zero during deserialization, and scores are
/// clamped so every emitted similarity is in `0..=1`.
pub fn normalize(raw: &RawRetrieval) -> Vec<RetrievalSource> {
    match raw {
        RawRetrieval::Vector(response) => response
            .sources
            .iter()
            .map(|hit| RetrievalSource {
                text: hit.text.clone(),
                similarity: clamp_score(hit.score),
                origin_label: hit.filename.clone(),
                locator: Some(SourceLocator {
                    page: hit.page,
                    chunk_index: Some(hit.chunk_index),
                    link: hit.link.clone(),
                }),
            })
            .collect(),
        RawRetrieval::Vision(response) => response
            .pages
            .iter()
            .map(|group| RetrievalSource {
                text: if group.title.is_empty() {
                    group.summary.clone()
                } else {
                    format!("{}: {}", group.title, group.summary)
                },
                similarity: SENTINEL_SIMILARITY,
                origin_label: page_range_label(group.page_start, group.page_end),
                locator: Some(SourceLocator {
                    page: Some(group.page_start),
                    chunk_index: None,
                    link: None,
                }),
            })
            .collect(),
    }
}

fn clamp_score(score: f32) -> f32 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn page_range_label(start: u32, end: u32) -> String {
    if end > start {
        format!("pages {start}-{end}")
    } else {
        format!("page {start}")
    }
}
