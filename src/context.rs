//! Context assembly with citation tracking.

use serde::{Deserialize, Serialize};

use crate::document::RankedChunk;

/// Source attribution for one chunk that contributed to a context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    /// Filename of the owning document.
    pub filename: String,
    /// Page number of the cited chunk.
    pub page: u32,
    /// The relevance score the chunk was selected with.
    pub score: f32,
}

/// The bounded textual context handed to answer synthesis, plus the
/// citations for the chunks it was built from. Ephemeral, built per query.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Ranked chunk texts joined by a blank line; empty when nothing ranked.
    pub text: String,
    /// One citation per contributing chunk, in ranked order.
    pub sources: Vec<Citation>,
}

impl Context {
    /// Assemble a context from ranked, filtered chunks.
    pub fn from_ranked(ranked: &[RankedChunk]) -> Self {
        let text =
            ranked.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join("\n\n");
        let sources = ranked
            .iter()
            .map(|c| Citation { filename: c.filename.clone(), page: c.page, score: c.score })
            .collect();
        Self { text, sources }
    }

    /// Whether the context carries no text at all.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ScoreStrategy;

    fn ranked(text: &str, filename: &str, page: u32, score: f32) -> RankedChunk {
        RankedChunk {
            text: text.to_string(),
            filename: filename.to_string(),
            page,
            score,
            strategy: ScoreStrategy::Vector,
        }
    }

    #[test]
    fn joins_chunk_texts_with_a_blank_line() {
        let context = Context::from_ranked(&[
            ranked("first passage", "a.pdf", 1, 0.9),
            ranked("second passage", "b.pdf", 4, 0.7),
        ]);
        assert_eq!(context.text, "first passage\n\nsecond passage");
    }

    #[test]
    fn citations_parallel_the_ranked_order() {
        let context = Context::from_ranked(&[
            ranked("x", "a.pdf", 1, 0.9),
            ranked("y", "b.pdf", 4, 0.7),
        ]);
        assert_eq!(
            context.sources,
            vec![
                Citation { filename: "a.pdf".into(), page: 1, score: 0.9 },
                Citation { filename: "b.pdf".into(), page: 4, score: 0.7 },
            ]
        );
    }

    #[test]
    fn empty_input_yields_an_empty_context() {
        let context = Context::from_ranked(&[]);
        assert!(context.is_empty());
        assert!(context.sources.is_empty());
    }
}
