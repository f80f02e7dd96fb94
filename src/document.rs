//! Data types for documents, chunks, and ranked retrieval results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ingested source document with its ordered chunks.
///
/// Documents are created once at ingestion time and never mutated
/// afterwards; embeddings are attached to chunks before the document is
/// handed to the repository, so readers never observe a partially built
/// document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: Uuid,
    /// The filename the document was ingested under.
    pub filename: String,
    /// The full extracted text.
    pub text: String,
    /// Ordered chunks; indices are contiguous starting at 0.
    pub chunks: Vec<Chunk>,
    /// When the document was ingested.
    pub uploaded_at: DateTime<Utc>,
    /// Size of the extracted text in bytes.
    pub size_bytes: usize,
}

impl Document {
    /// Create a new document with no chunks yet.
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            size_bytes: text.len(),
            text,
            chunks: Vec::new(),
            uploaded_at: Utc::now(),
        }
    }

    /// Number of chunks that carry an embedding vector.
    pub fn embedded_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.embedding.is_some()).count()
    }
}

/// A windowed segment of a [`Document`]'s text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// The text content of the chunk.
    pub text: String,
    /// Best-effort page number (1-based); synthetic when the source has no
    /// real page boundaries.
    pub page: u32,
    /// Position within the parent document, 0-based and gap-free.
    pub index: usize,
    /// The embedding vector, or `None` when the chunk was never embedded
    /// (over the per-document cap, or the provider call failed).
    pub embedding: Option<Vec<f32>>,
}

/// Which ranking strategy produced a score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStrategy {
    /// Cosine similarity between the query vector and the chunk embedding.
    Vector,
    /// Distinct keyword-token substring matches.
    Keyword,
}

/// A chunk scored against a query, with its owning document's filename.
///
/// Produced fresh per query and discarded with the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedChunk {
    /// The chunk text.
    pub text: String,
    /// Filename of the owning document.
    pub filename: String,
    /// Page number of the chunk.
    pub page: u32,
    /// The relevance score (higher is more relevant).
    pub score: f32,
    /// Which strategy produced the score.
    pub strategy: ScoreStrategy,
}
