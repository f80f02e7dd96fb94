//! Configuration for the question-answering pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{QaError, Result};

/// Configuration parameters for the question-answering pipeline.
///
/// The keyword-fallback tunables (`fallback_threshold`, `keyword_weight`)
/// carry the values the system has always shipped with; they have no
/// derivation beyond observed behavior, so they are exposed here rather
/// than buried as literals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaConfig {
    /// Window size in characters for chunking.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Minimum trimmed length a window must exceed to be kept as a chunk.
    pub min_chunk_len: usize,
    /// Characters per synthetic page when real page boundaries are unknown.
    pub chars_per_page: usize,
    /// Maximum number of chunks embedded per ingested document.
    pub max_embedded_chunks: usize,
    /// Minimum delay between consecutive embedding calls, in milliseconds.
    pub embed_interval_ms: u64,
    /// Number of top-ranked chunks retained for context assembly.
    pub top_k: usize,
    /// Top vector score below which ranking switches to the keyword strategy.
    pub fallback_threshold: f32,
    /// Question tokens must be strictly longer than this to count as keywords.
    pub min_token_len: usize,
    /// Score contributed by each distinct matched keyword token.
    pub keyword_weight: f32,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            min_chunk_len: 50,
            chars_per_page: 3000,
            max_embedded_chunks: 50,
            embed_interval_ms: 200,
            top_k: 3,
            fallback_threshold: 0.01,
            min_token_len: 3,
            keyword_weight: 0.1,
        }
    }
}

impl QaConfig {
    /// Create a new builder for constructing a [`QaConfig`].
    pub fn builder() -> QaConfigBuilder {
        QaConfigBuilder::default()
    }

    /// The minimum delay between consecutive embedding calls.
    pub fn embed_interval(&self) -> Duration {
        Duration::from_millis(self.embed_interval_ms)
    }
}

/// Builder for constructing a validated [`QaConfig`].
#[derive(Debug, Clone, Default)]
pub struct QaConfigBuilder {
    config: QaConfig,
}

impl QaConfigBuilder {
    /// Set the chunk window size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the minimum trimmed chunk length.
    pub fn min_chunk_len(mut self, len: usize) -> Self {
        self.config.min_chunk_len = len;
        self
    }

    /// Set the synthetic page size in characters.
    pub fn chars_per_page(mut self, chars: usize) -> Self {
        self.config.chars_per_page = chars;
        self
    }

    /// Set the per-document embedding cap.
    pub fn max_embedded_chunks(mut self, max: usize) -> Self {
        self.config.max_embedded_chunks = max;
        self
    }

    /// Set the minimum delay between consecutive embedding calls.
    pub fn embed_interval(mut self, interval: Duration) -> Self {
        self.config.embed_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the number of top-ranked chunks retained for context assembly.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the vector-score threshold below which the keyword fallback fires.
    pub fn fallback_threshold(mut self, threshold: f32) -> Self {
        self.config.fallback_threshold = threshold;
        self
    }

    /// Set the minimum keyword token length (exclusive).
    pub fn min_token_len(mut self, len: usize) -> Self {
        self.config.min_token_len = len;
        self
    }

    /// Set the per-keyword score weight.
    pub fn keyword_weight(mut self, weight: f32) -> Self {
        self.config.keyword_weight = weight;
        self
    }

    /// Build the [`QaConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::ConfigError`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `chars_per_page == 0`
    /// - `keyword_weight` is not a positive finite number
    pub fn build(self) -> Result<QaConfig> {
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(QaError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(QaError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if self.config.chars_per_page == 0 {
            return Err(QaError::ConfigError(
                "chars_per_page must be greater than zero".to_string(),
            ));
        }
        if !(self.config.keyword_weight.is_finite() && self.config.keyword_weight > 0.0) {
            return Err(QaError::ConfigError(
                "keyword_weight must be a positive finite number".to_string(),
            ));
        }
        Ok(self.config)
    }
}
