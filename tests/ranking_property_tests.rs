//! Property tests for ranking order and fallback behavior.

use docqa::document::Chunk;
use docqa::ranking::{Ranker, cosine_similarity};
use docqa::repository::CorpusChunk;
use docqa::{QaConfig, ScoreStrategy};
use proptest::prelude::*;

const DIM: usize = 8;

/// Generate a non-zero embedding of the given dimension.
fn arb_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter("non-zero embedding", |v| {
        v.iter().map(|x| x * x).sum::<f32>().sqrt() > 1e-6
    })
}

/// Generate a chunk with an optional embedding.
fn arb_chunk() -> impl Strategy<Value = Chunk> {
    ("[a-z ]{10,60}", proptest::option::of(arb_embedding(DIM))).prop_map(|(text, embedding)| {
        Chunk { text, page: 1, index: 0, embedding }
    })
}

fn corpus(chunks: &[Chunk]) -> Vec<CorpusChunk<'_>> {
    chunks.iter().map(|chunk| CorpusChunk { chunk, filename: "doc.pdf" }).collect()
}

fn ranker() -> Ranker {
    Ranker::from_config(&QaConfig::default())
}

/// *For any* corpus and query, ranked results are ordered by descending
/// score, hold at most `top_k` entries, and contain no non-positive scores.
mod prop_rank_order_and_bounds {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn descending_bounded_and_positive(
            chunks in proptest::collection::vec(arb_chunk(), 0..25),
            query in arb_embedding(DIM),
            question in "[a-z ]{0,40}",
        ) {
            let corpus = corpus(&chunks);
            let ranking = ranker().rank(&question, &query, &corpus);

            prop_assert!(ranking.results.len() <= 3);
            for pair in ranking.results.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
            for result in &ranking.results {
                prop_assert!(result.score > 0.0);
            }
        }
    }
}

/// *For any* corpus and query, ranking twice over the unchanged corpus
/// yields identical ordered output (scores, texts, and strategy).
mod prop_rank_idempotent {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn repeated_ranking_is_identical(
            chunks in proptest::collection::vec(arb_chunk(), 0..15),
            query in arb_embedding(DIM),
            question in "[a-z ]{0,40}",
        ) {
            let corpus = corpus(&chunks);
            let first = ranker().rank(&question, &query, &corpus);
            let second = ranker().rank(&question, &query, &corpus);

            prop_assert_eq!(first.strategy, second.strategy);
            prop_assert_eq!(first.results.len(), second.results.len());
            for (a, b) in first.results.iter().zip(&second.results) {
                prop_assert_eq!(&a.text, &b.text);
                prop_assert_eq!(a.score, b.score);
            }
        }
    }
}

/// *For any* wholly unembedded corpus where at least one chunk contains a
/// question keyword, ranking falls back to the keyword strategy and never
/// returns an empty result.
mod prop_keyword_fallback_recall {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn fallback_finds_the_keyword(
            keyword in "[a-z]{4,10}",
            prefix in "[a-z ]{0,30}",
            decoys in proptest::collection::vec("[0-9 ]{5,40}", 0..10),
        ) {
            let mut chunks: Vec<Chunk> = decoys
                .iter()
                .map(|text| Chunk { text: text.clone(), page: 1, index: 0, embedding: None })
                .collect();
            chunks.push(Chunk {
                text: format!("{prefix} {keyword}"),
                page: 1,
                index: 0,
                embedding: None,
            });

            let corpus = corpus(&chunks);
            let ranking = ranker().rank(&keyword, &[], &corpus);

            prop_assert_eq!(ranking.strategy, ScoreStrategy::Keyword);
            prop_assert!(!ranking.results.is_empty());
            prop_assert!(ranking.results[0].text.contains(keyword.as_str()));
        }
    }
}

/// *For any* vector, cosine similarity with itself is 1 and similarity is
/// symmetric.
mod prop_cosine {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn self_similarity_is_one(v in arb_embedding(DIM)) {
            prop_assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-4);
        }

        #[test]
        fn symmetric(a in arb_embedding(DIM), b in arb_embedding(DIM)) {
            prop_assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
        }
    }
}
