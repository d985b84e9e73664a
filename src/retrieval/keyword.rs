//! Keyword-overlap retrieval.

use super::RetrievedChunk;
use crate::store::IndexedChunk;
use std::collections::HashMap;

/// Score chunks by term-frequency-weighted overlap with the query.
///
/// Both query and chunk text are lowercased and split on whitespace. A
/// chunk's score is the sum, over distinct query terms, of how often that
/// term appears in the chunk. Chunks with zero overlap are excluded; if no
/// chunk overlaps at all, the first `limit` chunks are returned in index
/// order so a non-empty index never produces an empty result.
pub fn keyword_search(chunks: &[IndexedChunk], query: &str, limit: usize) -> Vec<RetrievedChunk> {
    let query_terms: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(|t| t.to_string())
        .collect();

    let mut scored: Vec<(f32, &IndexedChunk)> = chunks
        .iter()
        .filter_map(|chunk| {
            let score = overlap_score(&chunk.text, &query_terms);
            (score > 0.0).then_some((score, chunk))
        })
        .collect();

    let selected: Vec<&IndexedChunk> = if scored.is_empty() {
        // Deterministic fallback: leading chunks in position order.
        chunks.iter().take(limit).collect()
    } else {
        // sort_by is stable, so equal scores keep index order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        scored.iter().map(|(_, c)| *c).collect()
    };

    selected
        .into_iter()
        .map(|chunk| RetrievedChunk {
            chunk_id: chunk.chunk_id.clone(),
            video_name: chunk.video_name.clone(),
            text: chunk.text.clone(),
            start_seconds: chunk.start_seconds,
            end_seconds: chunk.end_seconds,
            score: overlap_score(&chunk.text, &query_terms),
        })
        .collect()
}

fn overlap_score(text: &str, query_terms: &[String]) -> f32 {
    if query_terms.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<&str, u32> = HashMap::new();
    let lowered = text.to_lowercase();
    for token in lowered.split_whitespace() {
        *counts.entry(token).or_insert(0) += 1;
    }

    let mut seen: Vec<&str> = Vec::new();
    let mut score = 0u32;
    for term in query_terms {
        if seen.contains(&term.as_str()) {
            continue;
        }
        seen.push(term);
        score += counts.get(term.as_str()).copied().unwrap_or(0);
    }
    score as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn chunk(id: &str, position: i64, text: &str) -> IndexedChunk {
        IndexedChunk {
            chunk_id: id.to_string(),
            video_name: "talk".to_string(),
            text: text.to_string(),
            start_seconds: position as f64 * 10.0,
            end_seconds: position as f64 * 10.0 + 10.0,
            embedding: Vec::new(),
            position,
            indexed_at: Utc::now(),
        }
    }

    #[test]
    fn test_ranks_by_term_frequency() {
        let chunks = vec![
            chunk("chunk-1", 0, "rust is mentioned once here"),
            chunk("chunk-2", 1, "rust rust rust everywhere rust"),
        ];

        let results = keyword_search(&chunks, "rust", 2);
        assert_eq!(results[0].chunk_id, "chunk-2");
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn test_zero_overlap_excluded() {
        let chunks = vec![
            chunk("chunk-1", 0, "all about cooking pasta"),
            chunk("chunk-2", 1, "compilers and type systems"),
        ];

        let results = keyword_search(&chunks, "compilers", 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk_id, "chunk-2");
    }

    #[test]
    fn test_fallback_when_nothing_matches() {
        let chunks = vec![
            chunk("chunk-1", 0, "alpha beta"),
            chunk("chunk-2", 1, "gamma delta"),
            chunk("chunk-3", 2, "epsilon zeta"),
        ];

        // Never empty for a non-empty chunk set.
        let results = keyword_search(&chunks, "zzzzz", 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk_id, "chunk-1");
        assert_eq!(results[1].chunk_id, "chunk-2");
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let chunks = vec![chunk("chunk-1", 0, "The Rust Programming Language")];
        let results = keyword_search(&chunks, "RUST language", 1);
        assert_eq!(results[0].score, 2.0);
    }

    #[test]
    fn test_repeated_query_terms_counted_once() {
        let chunks = vec![chunk("chunk-1", 0, "rust here")];
        let once = keyword_search(&chunks, "rust", 1);
        let thrice = keyword_search(&chunks, "rust rust rust", 1);
        assert_eq!(once[0].score, thrice[0].score);
    }

    #[test]
    fn test_ties_keep_index_order() {
        let chunks = vec![
            chunk("chunk-1", 0, "tie word"),
            chunk("chunk-2", 1, "tie word"),
            chunk("chunk-3", 2, "tie word"),
        ];

        let results = keyword_search(&chunks, "tie", 3);
        let ids: Vec<&str> = results.iter().map(|r| r.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["chunk-1", "chunk-2", "chunk-3"]);
    }

    #[test]
    fn test_empty_chunks_give_empty_results() {
        let results = keyword_search(&[], "anything", 3);
        assert!(results.is_empty());
    }
}
