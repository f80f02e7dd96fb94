//! Question-answering pipeline orchestrator.
//!
//! The [`QaPipeline`] wires the core together. Ingestion runs
//! chunk → embed (throttled, capped) → store; querying runs
//! embed question → rank → assemble context → synthesize. The two paths
//! share only the [`DocumentRepository`]. Each workflow is a linear
//! pipeline; the only failure it surfaces is a question that cannot be
//! embedded — everything else resolves to a degraded outcome.
//!
//! # Example
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
//! pipeline.ingest(SourceText::Plain(text), "handbook.pdf").await?;
//! match pipeline.ask("what is the refund policy?").await? {
//!     AskOutcome::Answered(answer) => println!("{}", answer.text),
//!     other => println!("{other:?}"),
//! }
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chunking::{Chunker, SourceText, WindowChunker};
use crate::config::QaConfig;
use crate::context::{Citation, Context};
use crate::document::{Document, ScoreStrategy};
use crate::embedder::{SkippedChunk, ThrottledEmbedder};
use crate::embedding::EmbeddingProvider;
use crate::error::{QaError, Result};
use crate::ranking::Ranker;
use crate::repository::{DocumentRepository, all_chunks};
use crate::synthesis::{AnswerMode, GenerationProvider, Synthesizer};

/// What happened to one ingested document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestReport {
    /// Number of chunks produced and stored.
    pub chunk_count: usize,
    /// Number of chunks that received an embedding vector.
    pub embedded_count: usize,
    /// Chunks stored without a vector, with reasons.
    pub skipped: Vec<SkippedChunk>,
}

/// A synthesized (or fallback) answer with its source attributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The answer text.
    pub text: String,
    /// Citations for the chunks the context was built from.
    pub sources: Vec<Citation>,
    /// Which ranking strategy selected the context.
    pub strategy: ScoreStrategy,
    /// Whether the text was synthesized or is the raw-context fallback.
    pub mode: AnswerMode,
}

/// The structured outcome of asking a question.
///
/// Only [`Answered`](AskOutcome::Answered) carries sources; the other
/// variants are descriptive non-error responses, not faults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum AskOutcome {
    /// A context was found and an answer produced.
    Answered(Answer),
    /// The question was empty or whitespace-only.
    EmptyQuestion,
    /// The corpus holds no documents at all.
    NoDocuments,
    /// Neither ranking strategy found a chunk with a positive score.
    NoRelevantContext,
}

/// Per-document corpus statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStats {
    /// The filename the document was ingested under.
    pub filename: String,
    /// Number of stored chunks.
    pub chunk_count: usize,
    /// Number of chunks carrying an embedding vector.
    pub embedded_count: usize,
    /// Size of the extracted text in bytes.
    pub size_bytes: usize,
    /// When the document was ingested.
    pub uploaded_at: DateTime<Utc>,
}

/// A summary of the stored corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusStats {
    /// One entry per stored document, in ingestion order.
    pub documents: Vec<DocumentStats>,
    /// Total number of chunks across all documents.
    pub total_chunks: usize,
}

/// The question-answering pipeline.
///
/// Construct one via [`QaPipeline::builder()`]. Cheap to share behind an
/// `Arc`; ingestion and query workflows may run concurrently.
pub struct QaPipeline {
    chunker: Arc<dyn Chunker>,
    embedder: ThrottledEmbedder,
    repository: Arc<dyn DocumentRepository>,
    ranker: Ranker,
    synthesizer: Synthesizer,
}

impl QaPipeline {
    /// Create a new [`QaPipelineBuilder`].
    pub fn builder() -> QaPipelineBuilder {
        QaPipelineBuilder::default()
    }

    /// Ingest a document: chunk → embed (throttled, capped) → store.
    ///
    /// The document becomes visible to queries only once fully stored.
    /// Per-chunk embedding failures do not fail the ingest; the affected
    /// chunks are stored without vectors and reported in the result.
    ///
    /// # Errors
    ///
    /// Returns an error only if the repository rejects the document.
    pub async fn ingest(&self, source: SourceText, filename: &str) -> Result<IngestReport> {
        let mut document = Document::new(filename, source.text().into_owned());
        let mut chunks = self.chunker.chunk(&source);

        let summary = self.embedder.embed_chunks(&mut chunks).await;
        document.chunks = chunks;

        let report = IngestReport {
            chunk_count: document.chunks.len(),
            embedded_count: summary.embedded,
            skipped: summary.skipped,
        };

        self.repository.create(document).await?;
        info!(
            filename,
            chunk_count = report.chunk_count,
            embedded_count = report.embedded_count,
            "ingested document"
        );

        Ok(report)
    }

    /// Answer a question from the stored corpus.
    ///
    /// Embeds the question, ranks every stored chunk (vector similarity
    /// with keyword fallback), assembles the top chunks into a context,
    /// and synthesizes an answer grounded in it. Empty corpus, blank
    /// question, and no-match cases return descriptive outcomes rather
    /// than errors; a generation failure degrades to the raw-context
    /// fallback answer.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::QueryEmbeddingError`] when the question itself
    /// cannot be embedded — the one failure this workflow surfaces.
    pub async fn ask(&self, question: &str) -> Result<AskOutcome> {
        if question.trim().is_empty() {
            return Ok(AskOutcome::EmptyQuestion);
        }

        let documents = self.repository.find_all().await?;
        if documents.is_empty() {
            info!("ask on empty corpus");
            return Ok(AskOutcome::NoDocuments);
        }

        let query_vector = self.embedder.embed_query(question).await?;

        let corpus: Vec<_> = all_chunks(&documents).collect();
        let ranking = self.ranker.rank(question, &query_vector, &corpus);
        if ranking.results.is_empty() {
            info!(chunk_count = corpus.len(), "no relevant context for question");
            return Ok(AskOutcome::NoRelevantContext);
        }

        let context = Context::from_ranked(&ranking.results);
        let (text, mode) = self.synthesizer.synthesize(question, &context.text).await;

        info!(
            sources = context.sources.len(),
            strategy = ?ranking.strategy,
            mode = ?mode,
            "answered question"
        );

        Ok(AskOutcome::Answered(Answer {
            text,
            sources: context.sources,
            strategy: ranking.strategy,
            mode,
        }))
    }

    /// Summarize the stored corpus for listings and health reporting.
    pub async fn corpus_stats(&self) -> Result<CorpusStats> {
        let documents = self.repository.find_all().await?;
        let documents: Vec<DocumentStats> = documents
            .iter()
            .map(|doc| DocumentStats {
                filename: doc.filename.clone(),
                chunk_count: doc.chunks.len(),
                embedded_count: doc.embedded_count(),
                size_bytes: doc.size_bytes,
                uploaded_at: doc.uploaded_at,
            })
            .collect();
        let total_chunks = documents.iter().map(|d| d.chunk_count).sum();
        Ok(CorpusStats { documents, total_chunks })
    }
}

/// Builder for constructing a [`QaPipeline`].
///
/// The embedding provider, generation provider, and repository are
/// required. The config defaults to [`QaConfig::default()`] and the
/// chunker to a [`WindowChunker`] built from that config.
#[derive(Default)]
pub struct QaPipelineBuilder {
    config: Option<QaConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    generation_provider: Option<Arc<dyn GenerationProvider>>,
    repository: Option<Arc<dyn DocumentRepository>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl QaPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: QaConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the generation provider.
    pub fn generation_provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.generation_provider = Some(provider);
        self
    }

    /// Set the document repository.
    pub fn repository(mut self, repository: Arc<dyn DocumentRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Override the default chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`QaPipeline`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::ConfigError`] if a required field is missing.
    pub fn build(self) -> Result<QaPipeline> {
        let config = self.config.unwrap_or_default();
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| QaError::ConfigError("embedding_provider is required".to_string()))?;
        let generation_provider = self
            .generation_provider
            .ok_or_else(|| QaError::ConfigError("generation_provider is required".to_string()))?;
        let repository = self
            .repository
            .ok_or_else(|| QaError::ConfigError("repository is required".to_string()))?;
        let chunker = self
            .chunker
            .unwrap_or_else(|| Arc::new(WindowChunker::from_config(&config)));

        Ok(QaPipeline {
            chunker,
            embedder: ThrottledEmbedder::new(
                embedding_provider,
                config.embed_interval(),
                config.max_embedded_chunks,
            ),
            repository,
            ranker: Ranker::from_config(&config),
            synthesizer: Synthesizer::new(generation_provider),
        })
    }
}
