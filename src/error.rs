//! Error types for the `docqa` crate.

use thiserror::Error;

/// Errors that can occur in the question-answering core.
#[derive(Debug, Error)]
pub enum QaError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The question itself could not be embedded.
    ///
    /// Unlike per-chunk embedding failures during ingestion (which are
    /// skipped), this is terminal for the request: without a query vector
    /// the vector strategy cannot apply at all.
    #[error("Failed to embed question: {0}")]
    QueryEmbeddingError(String),

    /// An error occurred during answer generation.
    ///
    /// This never escapes the synthesizer; it is absorbed into the
    /// context-fallback answer. It exists so generation providers have a
    /// typed failure to return.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the document repository backend.
    #[error("Repository error ({backend}): {message}")]
    RepositoryError {
        /// The repository backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A convenience result type for question-answering operations.
pub type Result<T> = std::result::Result<T, QaError>;
