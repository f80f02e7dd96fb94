//! Answer synthesis over an assembled context.
//!
//! The [`Synthesizer`] wraps a [`GenerationProvider`] with the grounding
//! prompt and the degradation contract: a provider failure (quota, timeout,
//! overload) never reaches the caller. Instead the raw context is returned
//! verbatim under a fallback banner, flagged as [`AnswerMode::ContextFallback`],
//! so the user keeps the retrieved material even without synthesis. The
//! fallback is terminal; there is no retry.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// A provider that generates text from a prompt.
///
/// Treated as potentially slow and unreliable; its errors are absorbed by
/// the [`Synthesizer`] and never propagate further.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// How an answer was produced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    /// The generation provider synthesized the answer from the context.
    Synthesized,
    /// Generation failed; the answer is the raw context under a banner.
    ContextFallback,
}

/// Banner prepended to the raw context when generation is unavailable.
const FALLBACK_BANNER: &str = "**Answer generation unavailable (fallback mode)**\n\n\
    A summarized answer could not be generated, but here is the most \
    relevant information found in your documents:";

/// Builds grounding prompts and absorbs generation failures.
pub struct Synthesizer {
    provider: Arc<dyn GenerationProvider>,
}

impl Synthesizer {
    /// Create a synthesizer over the given generation provider.
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self { provider }
    }

    /// Build the grounding prompt for a question and its context.
    ///
    /// The prompt constrains the provider to the supplied context, tells it
    /// to admit when the context is insufficient, and asks for inline
    /// `[filename, Page N]` citations.
    pub fn build_prompt(question: &str, context: &str) -> String {
        format!(
            "You are an assistant that answers questions about ingested documents.\n\
             \n\
             Context information is below.\n\
             ---------------------\n\
             {context}\n\
             ---------------------\n\
             \n\
             Given the context information and not prior knowledge, answer the question.\n\
             Answer ONLY from the context above. If the answer is not in the context,\n\
             say you do not know. Cite sources inline as [filename, Page N] and keep\n\
             the answer concise.\n\
             \n\
             Question: {question}\n\
             \n\
             Answer:"
        )
    }

    /// The fallback answer wrapping the raw context verbatim.
    pub fn fallback_answer(context: &str) -> String {
        format!("{FALLBACK_BANNER}\n\n{context}")
    }

    /// Synthesize an answer, degrading to the context fallback on failure.
    pub async fn synthesize(&self, question: &str, context: &str) -> (String, AnswerMode) {
        let prompt = Self::build_prompt(question, context);
        debug!(prompt_len = prompt.len(), "requesting answer generation");

        match self.provider.generate(&prompt).await {
            Ok(answer) => (answer, AnswerMode::Synthesized),
            Err(e) => {
                warn!(error = %e, "generation failed, returning raw context");
                (Self::fallback_answer(context), AnswerMode::ContextFallback)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QaError;

    struct EchoProvider;

    #[async_trait]
    impl GenerationProvider for EchoProvider {
        async fn generate(&self, prompt: &str) -> Result<String> {
            Ok(format!("echo: {}", prompt.len()))
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl GenerationProvider for FailingProvider {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(QaError::GenerationError {
                provider: "stub".into(),
                message: "quota exhausted".into(),
            })
        }
    }

    #[test]
    fn prompt_embeds_question_and_context() {
        let prompt = Synthesizer::build_prompt("why?", "because of reasons");
        assert!(prompt.contains("Question: why?"));
        assert!(prompt.contains("because of reasons"));
        assert!(prompt.contains("not prior knowledge"));
    }

    #[tokio::test]
    async fn successful_generation_is_flagged_synthesized() {
        let synthesizer = Synthesizer::new(Arc::new(EchoProvider));
        let (answer, mode) = synthesizer.synthesize("q", "ctx").await;
        assert!(answer.starts_with("echo:"));
        assert_eq!(mode, AnswerMode::Synthesized);
    }

    #[tokio::test]
    async fn generation_failure_returns_context_verbatim() {
        let synthesizer = Synthesizer::new(Arc::new(FailingProvider));
        let context = "chunk one\n\nchunk two";
        let (answer, mode) = synthesizer.synthesize("q", context).await;
        assert_eq!(mode, AnswerMode::ContextFallback);
        assert_eq!(answer, Synthesizer::fallback_answer(context));
        assert!(answer.ends_with(context));
    }
}
