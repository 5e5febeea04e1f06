use crate::models::{DocumentChunk, ScoredChunk};
use crate::scoring::calculate_similarity;
use std::cmp::Ordering;

/// Scores every chunk against `query` and keeps the `top_k` best.
///
/// Results are ordered by descending score; equal scores keep ascending chunk
/// index order. An empty chunk list or `top_k == 0` returns nothing.
pub fn search_chunks(query: &str, chunks: &[DocumentChunk], top_k: usize) -> Vec<ScoredChunk> {
    if top_k == 0 {
        return Vec::new();
    }

    let mut scored: Vec<ScoredChunk> = chunks
        .iter()
        .map(|chunk| ScoredChunk {
            content: chunk.content.clone(),
            score: calculate_similarity(query, &chunk.content),
            index: chunk.index,
        })
        .collect();

    scored.sort_by(rank_order);
    scored.truncate(top_k);
    scored
}

fn rank_order(left: &ScoredChunk, right: &ScoredChunk) -> Ordering {
    right
        .score
        .total_cmp(&left.score)
        .then_with(|| left.index.cmp(&right.index))
}
