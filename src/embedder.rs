//! Throttled, capped embedding of document chunks.
//!
//! The embedding provider is rate-limited and costed per call, so the
//! ingestion path embeds through [`ThrottledEmbedder`]: a fixed-interval
//! gate spaces the calls and a per-document cap bounds how many chunks of
//! one document are embedded at all. Chunks past the cap, and chunks whose
//! provider call fails, are kept without a vector and recorded in the
//! [`EmbedSummary`]; they still participate in keyword-fallback ranking.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::Chunk;
use crate::embedding::EmbeddingProvider;
use crate::error::{QaError, Result};
use crate::throttle::FixedIntervalGate;

/// Why a chunk was left without an embedding during ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum SkipReason {
    /// The per-document embedding cap was already reached.
    CapReached,
    /// The embedding provider returned an error for this chunk.
    Provider(String),
}

/// A chunk that was stored without a vector, and why.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedChunk {
    /// Index of the chunk within its document.
    pub index: usize,
    /// Why the chunk was skipped.
    pub reason: SkipReason,
}

/// Per-document outcome of the embedding step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbedSummary {
    /// Number of chunks that received a vector.
    pub embedded: usize,
    /// Chunks left without a vector, with reasons.
    pub skipped: Vec<SkippedChunk>,
}

/// Embeds chunks through a rate gate, up to a per-document cap.
pub struct ThrottledEmbedder {
    provider: Arc<dyn EmbeddingProvider>,
    gate: FixedIntervalGate,
    max_chunks: usize,
}

impl ThrottledEmbedder {
    /// Create a new embedder.
    ///
    /// # Arguments
    ///
    /// * `provider` — the embedding backend
    /// * `interval` — minimum delay between consecutive provider calls
    /// * `max_chunks` — per-document cap on embedded chunks
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        interval: Duration,
        max_chunks: usize,
    ) -> Self {
        Self { provider, gate: FixedIntervalGate::new(interval), max_chunks }
    }

    /// Return a reference to the underlying embedding provider.
    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Embed a document's chunks in place, up to the cap.
    ///
    /// Never fails: per-chunk provider errors are recorded as skips and the
    /// chunk keeps `embedding: None`.
    pub async fn embed_chunks(&self, chunks: &mut [Chunk]) -> EmbedSummary {
        let mut summary = EmbedSummary::default();

        // The cap bounds provider calls, so it counts attempts: the first
        // `max_chunks` chunks are tried, the rest are skipped outright.
        for (attempt, chunk) in chunks.iter_mut().enumerate() {
            if attempt >= self.max_chunks {
                summary.skipped.push(SkippedChunk {
                    index: chunk.index,
                    reason: SkipReason::CapReached,
                });
                continue;
            }

            self.gate.wait().await;
            match self.provider.embed(&chunk.text).await {
                Ok(vector) => {
                    debug!(chunk.index, dimensions = vector.len(), "embedded chunk");
                    chunk.embedding = Some(vector);
                    summary.embedded += 1;
                }
                Err(e) => {
                    warn!(chunk.index, error = %e, "chunk embedding failed, storing without vector");
                    summary.skipped.push(SkippedChunk {
                        index: chunk.index,
                        reason: SkipReason::Provider(e.to_string()),
                    });
                }
            }
        }

        summary
    }

    /// Embed the question text.
    ///
    /// Unlike per-chunk failures, a failure here is terminal for the
    /// request: without a query vector the vector strategy cannot apply.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::QueryEmbeddingError`] if the provider call fails.
    pub async fn embed_query(&self, question: &str) -> Result<Vec<f32>> {
        self.gate.wait().await;
        self.provider
            .embed(question)
            .await
            .map_err(|e| QaError::QueryEmbeddingError(e.to_string()))
    }
}
