//! # docqa
//!
//! Retrieval-augmented question answering over ingested documents: windowed
//! chunking, embedding-based similarity ranking with a keyword fallback,
//! bounded context assembly with citation tracking, and grounded answer
//! synthesis that degrades gracefully when the generation provider fails.
//!
//! ## Architecture
//!
//! - **Ingestion** (write path): [`Chunker`] → [`ThrottledEmbedder`] →
//!   [`DocumentRepository`]
//! - **Querying** (read path): [`ThrottledEmbedder`] → [`Ranker`] →
//!   [`Context`] → [`Synthesizer`]
//!
//! The two paths share only the repository. The external embedding and
//! generation providers plug in behind the [`EmbeddingProvider`] and
//! [`GenerationProvider`] traits; a rate-limited Gemini client is available
//! behind the `gemini` feature.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa::{AskOutcome, InMemoryRepository, QaConfig, QaPipeline, SourceText};
//!
//! let pipeline = QaPipeline::builder()
//!     .config(QaConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .generation_provider(Arc::new(generator))
//!     .repository(Arc::new(InMemoryRepository::new()))
//!     .build()?;
//!
//! let report = pipeline.ingest(SourceText::Plain(text), "handbook.pdf").await?;
//! let outcome = pipeline.ask("what is the refund policy?").await?;
//! ```

pub mod chunking;
pub mod config;
pub mod context;
pub mod document;
pub mod embedder;
pub mod embedding;
pub mod error;
pub mod pipeline;
pub mod ranking;
pub mod repository;
pub mod synthesis;
pub mod throttle;

#[cfg(feature = "gemini")]
pub mod gemini;

pub use chunking::{Chunker, PageText, SourceText, WindowChunker};
pub use config::{QaConfig, QaConfigBuilder};
pub use context::{Citation, Context};
pub use document::{Chunk, Document, RankedChunk, ScoreStrategy};
pub use embedder::{EmbedSummary, SkipReason, SkippedChunk, ThrottledEmbedder};
pub use embedding::EmbeddingProvider;
pub use error::{QaError, Result};
pub use pipeline::{
    Answer, AskOutcome, CorpusStats, DocumentStats, IngestReport, QaPipeline, QaPipelineBuilder,
};
pub use ranking::{Ranker, Ranking, cosine_similarity};
pub use repository::{CorpusChunk, DocumentRepository, InMemoryRepository, all_chunks};
pub use synthesis::{AnswerMode, GenerationProvider, Synthesizer};
pub use throttle::FixedIntervalGate;

#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;
