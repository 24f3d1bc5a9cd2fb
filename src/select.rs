//! Ranking and filtering of candidate releases for interactive review.
//!
//! Pure functions over an already-fetched release list; no network calls.

use crate::arr::ReleaseCandidate;

/// Rank of the release source extracted from the quality label. Resolution
/// within a source is settled by the size tie-break, not the rank.
fn quality_rank(label: &str) -> u8 {
    let label = label.to_lowercase();
    if label.contains("remux") {
        6
    } else if label.contains("bluray") || label.contains("blu-ray") {
        5
    } else if label.contains("webdl") || label.contains("web-dl") {
        4
    } else if label.contains("webrip") {
        3
    } else if label.contains("hdtv") {
        2
    } else if label.contains("dvd") {
        1
    } else {
        0
    }
}

/// Order candidates for human review: best source first, bigger first within
/// a source. An optional filter term restricts to titles containing it
/// case-insensitively; an empty result is a valid outcome, not an error.
pub fn select(candidates: &[ReleaseCandidate], filter: Option<&str>) -> Vec<ReleaseCandidate> {
    let mut out: Vec<ReleaseCandidate> = match filter {
        Some(term) if !term.is_empty() => {
            let term = term.to_lowercase();
            candidates
                .iter()
                .filter(|c| c.title.to_lowercase().contains(&term))
                .cloned()
                .collect()
        }
        _ => candidates.to_vec(),
    };

    // Stable sort: candidates tied on rank and size keep indexer order.
    out.sort_by(|a, b| {
        quality_rank(b.quality_label())
            .cmp(&quality_rank(a.quality_label()))
            .then(b.size.cmp(&a.size))
    });

    out
}
