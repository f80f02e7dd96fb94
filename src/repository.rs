//! Document repository trait and in-memory implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Chunk, Document};
use crate::error::Result;

/// Storage for ingested documents.
///
/// The core is agnostic to whether the backing store is durable; it
/// requires only that [`find_all`](DocumentRepository::find_all) reflects
/// every prior completed [`create`](DocumentRepository::create). There is
/// no update or delete: documents are immutable once stored, and
/// re-ingesting the same file yields a second independent document.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Store a fully chunked (and possibly partially embedded) document.
    async fn create(&self, document: Document) -> Result<()>;

    /// Return a snapshot of all stored documents, in insertion order.
    async fn find_all(&self) -> Result<Vec<Arc<Document>>>;
}

/// A chunk paired with its owning document, as encountered when iterating
/// the whole corpus.
#[derive(Debug, Clone, Copy)]
pub struct CorpusChunk<'a> {
    /// The chunk itself.
    pub chunk: &'a Chunk,
    /// Filename of the owning document.
    pub filename: &'a str,
}

/// Iterate every chunk of every document, in ingestion order.
///
/// The iterator is a pure view over the snapshot, so iterating twice over
/// the same snapshot yields the same sequence.
pub fn all_chunks(documents: &[Arc<Document>]) -> impl Iterator<Item = CorpusChunk<'_>> {
    documents.iter().flat_map(|doc| {
        doc.chunks.iter().map(move |chunk| CorpusChunk { chunk, filename: &doc.filename })
    })
}

/// An in-memory [`DocumentRepository`] guarded by a `tokio::sync::RwLock`.
///
/// Documents become visible to readers only once `create` completes, so a
/// concurrent reader never observes a partially constructed document.
/// Suitable for development, testing, and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    documents: RwLock<Vec<Arc<Document>>>,
}

impl InMemoryRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryRepository {
    async fn create(&self, document: Document) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents.push(Arc::new(document));
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Arc<Document>>> {
        let documents = self.documents.read().await;
        Ok(documents.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(filename: &str, texts: &[&str]) -> Document {
        let mut document = Document::new(filename, texts.join(""));
        document.chunks = texts
            .iter()
            .enumerate()
            .map(|(index, text)| Chunk {
                text: text.to_string(),
                page: 1,
                index,
                embedding: None,
            })
            .collect();
        document
    }

    #[tokio::test]
    async fn find_all_reflects_creates_in_order() {
        let repo = InMemoryRepository::new();
        repo.create(doc("a.pdf", &["alpha"])).await.unwrap();
        repo.create(doc("b.pdf", &["beta"])).await.unwrap();

        let docs = repo.find_all().await.unwrap();
        let names: Vec<&str> = docs.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
    }

    #[tokio::test]
    async fn duplicate_filenames_are_stored_independently() {
        let repo = InMemoryRepository::new();
        repo.create(doc("same.pdf", &["first"])).await.unwrap();
        repo.create(doc("same.pdf", &["second"])).await.unwrap();

        let docs = repo.find_all().await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_ne!(docs[0].id, docs[1].id);
    }

    #[tokio::test]
    async fn all_chunks_walks_documents_in_ingestion_order() {
        let repo = InMemoryRepository::new();
        repo.create(doc("a.pdf", &["a0", "a1"])).await.unwrap();
        repo.create(doc("b.pdf", &["b0"])).await.unwrap();

        let docs = repo.find_all().await.unwrap();
        let texts: Vec<&str> = all_chunks(&docs).map(|c| c.chunk.text.as_str()).collect();
        assert_eq!(texts, vec!["a0", "a1", "b0"]);

        // Restartable: a second pass over the same snapshot is identical.
        let again: Vec<&str> = all_chunks(&docs).map(|c| c.chunk.text.as_str()).collect();
        assert_eq!(texts, again);
    }
}
