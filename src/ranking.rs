//! Chunk ranking: vector similarity with keyword fallback.
//!
//! The [`Ranker`] scores every known chunk against a query. The primary
//! strategy is cosine similarity between the query vector and each chunk's
//! embedding; when that yields nothing usable (no embeddings anywhere, or a
//! top score below the configured threshold), it discards the vector result
//! and rescans with substring keyword matching. The fallback guarantees
//! degraded-but-nonzero recall over chunks that were never embedded.

use std::collections::HashSet;

use tracing::debug;

use crate::config::QaConfig;
use crate::document::{RankedChunk, ScoreStrategy};
use crate::repository::CorpusChunk;

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched dimensions or zero-magnitude input; a
/// mismatched chunk vector disqualifies the chunk from vector scoring
/// rather than aborting the ranking operation.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// The outcome of ranking a query against the corpus.
#[derive(Debug, Clone)]
pub struct Ranking {
    /// Top-ranked chunks, descending by score, zero scores dropped.
    pub results: Vec<RankedChunk>,
    /// Which strategy produced the final result set.
    pub strategy: ScoreStrategy,
}

/// Scores chunks against a query and selects the best few.
#[derive(Debug, Clone)]
pub struct Ranker {
    top_k: usize,
    fallback_threshold: f32,
    min_token_len: usize,
    keyword_weight: f32,
}

impl Ranker {
    /// Create a `Ranker` from pipeline configuration.
    pub fn from_config(config: &QaConfig) -> Self {
        Self {
            top_k: config.top_k,
            fallback_threshold: config.fallback_threshold,
            min_token_len: config.min_token_len,
            keyword_weight: config.keyword_weight,
        }
    }

    /// Rank all chunks against the query.
    ///
    /// Runs the vector strategy first; if no chunk clears the fallback
    /// threshold, rescans with the keyword strategy. Either way the result
    /// is truncated to `top_k` and entries with score <= 0 are dropped.
    /// Sorting is stable, so equal scores keep corpus encounter order.
    pub fn rank(&self, question: &str, query_vector: &[f32], chunks: &[CorpusChunk<'_>]) -> Ranking {
        let mut scored = self.vector_scores(query_vector, chunks);
        let mut strategy = ScoreStrategy::Vector;

        let top_score = scored.first().map(|c| c.score).unwrap_or(0.0);
        if scored.is_empty() || top_score < self.fallback_threshold {
            debug!(top_score, "vector ranking below threshold, switching to keyword strategy");
            scored = self.keyword_scores(question, chunks);
            strategy = ScoreStrategy::Keyword;
        }

        scored.truncate(self.top_k);
        scored.retain(|c| c.score > 0.0);

        Ranking { results: scored, strategy }
    }

    fn vector_scores(&self, query_vector: &[f32], chunks: &[CorpusChunk<'_>]) -> Vec<RankedChunk> {
        let mut scored: Vec<RankedChunk> = chunks
            .iter()
            .map(|c| {
                let score = match &c.chunk.embedding {
                    Some(embedding) => cosine_similarity(query_vector, embedding),
                    None => 0.0,
                };
                ranked(c, score, ScoreStrategy::Vector)
            })
            .collect();
        sort_descending(&mut scored);
        scored
    }

    fn keyword_scores(&self, question: &str, chunks: &[CorpusChunk<'_>]) -> Vec<RankedChunk> {
        let keywords: HashSet<String> = question
            .split_whitespace()
            .map(|token| {
                token.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase()
            })
            .filter(|token| token.chars().count() > self.min_token_len)
            .collect();

        let mut scored: Vec<RankedChunk> = chunks
            .iter()
            .map(|c| {
                let text = c.chunk.text.to_lowercase();
                let matches = keywords.iter().filter(|kw| text.contains(kw.as_str())).count();
                let score = matches as f32 * self.keyword_weight;
                ranked(c, score, ScoreStrategy::Keyword)
            })
            .collect();
        sort_descending(&mut scored);
        scored
    }
}

fn ranked(c: &CorpusChunk<'_>, score: f32, strategy: ScoreStrategy) -> RankedChunk {
    RankedChunk {
        text: c.chunk.text.clone(),
        filename: c.filename.to_string(),
        page: c.chunk.page,
        score,
        strategy,
    }
}

/// Stable descending sort; ties keep the order chunks were encountered in.
fn sort_descending(scored: &mut [RankedChunk]) {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Chunk;

    fn chunk(text: &str, index: usize, embedding: Option<Vec<f32>>) -> Chunk {
        Chunk { text: text.to_string(), page: 1, index, embedding }
    }

    fn ranker() -> Ranker {
        Ranker::from_config(&QaConfig::default())
    }

    fn corpus<'a>(chunks: &'a [Chunk], filename: &'a str) -> Vec<CorpusChunk<'a>> {
        chunks.iter().map(|chunk| CorpusChunk { chunk, filename }).collect()
    }

    #[test]
    fn cosine_of_a_vector_with_itself_is_one() {
        let v = vec![0.3, -0.5, 0.8];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_is_symmetric() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![-2.0, 0.5, 1.0];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn mismatched_dimensions_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn zero_magnitude_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn identical_direction_uses_vector_strategy() {
        let chunks = vec![
            chunk("relevant text", 0, Some(vec![1.0, 0.0])),
            chunk("other text", 1, Some(vec![0.0, 1.0])),
        ];
        let ranking = ranker().rank("anything", &[1.0, 0.0], &corpus(&chunks, "doc.pdf"));

        assert_eq!(ranking.strategy, ScoreStrategy::Vector);
        assert_eq!(ranking.results.len(), 1);
        assert!((ranking.results[0].score - 1.0).abs() < 1e-6);
        assert_eq!(ranking.results[0].text, "relevant text");
    }

    #[test]
    fn unembedded_corpus_falls_back_to_keywords() {
        let chunks = vec![
            chunk("our refund policy lasts thirty days", 0, None),
            chunk("shipping is free worldwide", 1, None),
        ];
        let ranking =
            ranker().rank("what is the refund policy?", &[1.0, 0.0], &corpus(&chunks, "faq.pdf"));

        assert_eq!(ranking.strategy, ScoreStrategy::Keyword);
        assert_eq!(ranking.results.len(), 1);
        // Distinct matched tokens: "refund" and "policy" ("what" misses,
        // "is"/"the" are too short).
        assert!((ranking.results[0].score - 0.2).abs() < 1e-6);
    }

    #[test]
    fn keyword_tokens_are_trimmed_of_punctuation() {
        let chunks = vec![chunk("the refund policy", 0, None)];
        let ranking = ranker().rank("policy?", &[], &corpus(&chunks, "faq.pdf"));
        assert_eq!(ranking.results.len(), 1);
        assert!((ranking.results[0].score - 0.1).abs() < 1e-6);
    }

    #[test]
    fn repeated_question_tokens_count_once() {
        let chunks = vec![chunk("refund refund refund", 0, None)];
        let ranking = ranker().rank("refund refund refund", &[], &corpus(&chunks, "faq.pdf"));
        assert!((ranking.results[0].score - 0.1).abs() < 1e-6);
    }

    #[test]
    fn weak_vector_scores_trigger_the_fallback() {
        // Embeddings exist but the best similarity is below 0.01.
        let chunks = vec![
            chunk("refund policy details", 0, Some(vec![0.0001, 1.0])),
            chunk("unrelated", 1, Some(vec![0.0, 1.0])),
        ];
        let ranking = ranker().rank("refund", &[1.0, 0.0], &corpus(&chunks, "doc.pdf"));
        // Top cosine is ~0.0001, below the 0.01 threshold.
        assert_eq!(ranking.strategy, ScoreStrategy::Keyword);
        assert_eq!(ranking.results[0].text, "refund policy details");
    }

    #[test]
    fn results_are_descending_and_truncated_to_top_k() {
        let chunks: Vec<Chunk> = (0..6)
            .map(|i| {
                let x = 1.0 - i as f32 * 0.1;
                chunk(&format!("chunk {i}"), i, Some(vec![x, (1.0 - x * x).sqrt()]))
            })
            .collect();
        let ranking = ranker().rank("q", &[1.0, 0.0], &corpus(&chunks, "doc.pdf"));

        assert_eq!(ranking.results.len(), 3);
        for pair in ranking.results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn ties_preserve_encounter_order() {
        let chunks = vec![
            chunk("first refund", 0, None),
            chunk("second refund", 1, None),
            chunk("third refund", 2, None),
        ];
        let ranking = ranker().rank("refund", &[], &corpus(&chunks, "doc.pdf"));
        let texts: Vec<&str> = ranking.results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["first refund", "second refund", "third refund"]);
    }

    #[test]
    fn zero_scores_are_dropped_after_truncation() {
        let chunks = vec![
            chunk("refund information", 0, None),
            chunk("nothing relevant here", 1, None),
        ];
        let ranking = ranker().rank("refund", &[], &corpus(&chunks, "doc.pdf"));
        assert_eq!(ranking.results.len(), 1);
    }

    #[test]
    fn no_matches_anywhere_yields_empty_results() {
        let chunks = vec![chunk("completely unrelated text", 0, None)];
        let ranking = ranker().rank("zebra", &[], &corpus(&chunks, "doc.pdf"));
        assert_eq!(ranking.strategy, ScoreStrategy::Keyword);
        assert!(ranking.results.is_empty());
    }

    #[test]
    fn ranking_is_idempotent_over_an_unchanged_corpus() {
        let chunks = vec![
            chunk("refund policy text", 0, Some(vec![0.9, 0.1])),
            chunk("shipping policy text", 1, Some(vec![0.5, 0.5])),
        ];
        let corpus = corpus(&chunks, "doc.pdf");
        let first = ranker().rank("policy", &[1.0, 0.0], &corpus);
        let second = ranker().rank("policy", &[1.0, 0.0], &corpus);

        let scores = |r: &Ranking| -> Vec<(String, f32)> {
            r.results.iter().map(|c| (c.text.clone(), c.score)).collect()
        };
        assert_eq!(scores(&first), scores(&second));
        assert_eq!(first.strategy, second.strategy);
    }
}
