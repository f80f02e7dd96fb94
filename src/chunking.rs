//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`WindowChunker`], which
//! splits text into fixed-size overlapping windows. Chunking is a pure
//! function of its inputs: the same source always yields the same chunks,
//! with no embeddings attached.

use std::borrow::Cow;

use crate::config::QaConfig;
use crate::document::Chunk;

/// One page of extracted text, for sources that carry real page boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    /// The 1-based page number.
    pub page: u32,
    /// The text extracted from that page.
    pub text: String,
}

/// Raw text to be chunked, with or without known page boundaries.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceText {
    /// Text with no page information; pages are synthesized from offsets.
    Plain(String),
    /// Text with real page boundaries; chunks are tagged with the true page
    /// their starting offset falls on.
    Paged(Vec<PageText>),
}

impl SourceText {
    /// The full text of the source. Paged sources are joined with newlines.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            SourceText::Plain(text) => Cow::Borrowed(text.as_str()),
            SourceText::Paged(pages) => {
                let joined =
                    pages.iter().map(|p| p.text.as_str()).collect::<Vec<_>>().join("\n");
                Cow::Owned(joined)
            }
        }
    }
}

/// A strategy for splitting source text into chunks.
///
/// Implementations produce [`Chunk`]s with text, page, and index but no
/// embeddings. Embeddings are attached later by the ingestion pipeline.
pub trait Chunker: Send + Sync {
    /// Split source text into ordered chunks.
    ///
    /// Chunk indices are contiguous starting at 0.
    fn chunk(&self, source: &SourceText) -> Vec<Chunk>;
}

/// Splits text into fixed-size overlapping windows by character count.
///
/// The window start advances by `chunk_size - chunk_overlap` each step; a
/// window is kept only if its trimmed length exceeds `min_chunk_len`, which
/// discards degenerate trailing fragments. Page numbers come from real page
/// boundaries when the source has them, otherwise one synthetic page per
/// `chars_per_page` characters of offset.
///
/// # Example
///
/// ```rust,ignore
/// use docqa::{SourceText, WindowChunker};
///
/// let chunker = WindowChunker::new(1000, 200);
/// let chunks = chunker.chunk(&SourceText::Plain(text));
/// ```
#[derive(Debug, Clone)]
pub struct WindowChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    min_chunk_len: usize,
    chars_per_page: usize,
}

impl WindowChunker {
    /// Create a new `WindowChunker` with default minimum length (50) and
    /// synthetic page size (3000).
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — window size in characters
    /// * `chunk_overlap` — overlapping characters between consecutive windows
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap, min_chunk_len: 50, chars_per_page: 3000 }
    }

    /// Create a `WindowChunker` from pipeline configuration.
    pub fn from_config(config: &QaConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            min_chunk_len: config.min_chunk_len,
            chars_per_page: config.chars_per_page,
        }
    }
}

/// Character offsets (in the joined text) at which each page starts.
fn page_starts(pages: &[PageText]) -> Vec<(usize, u32)> {
    let mut starts = Vec::with_capacity(pages.len());
    let mut offset = 0;
    for (i, page) in pages.iter().enumerate() {
        starts.push((offset, page.page));
        // +1 for the newline joining pages
        offset += page.text.chars().count() + usize::from(i + 1 < pages.len());
    }
    starts
}

/// The page whose range contains the given character offset.
fn page_at(starts: &[(usize, u32)], offset: usize) -> u32 {
    starts
        .iter()
        .take_while(|(start, _)| *start <= offset)
        .last()
        .map(|(_, page)| *page)
        .unwrap_or(1)
}

impl Chunker for WindowChunker {
    fn chunk(&self, source: &SourceText) -> Vec<Chunk> {
        let text = source.text();
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let starts = match source {
            SourceText::Plain(_) => None,
            SourceText::Paged(pages) => Some(page_starts(pages)),
        };

        let step = self.chunk_size.saturating_sub(self.chunk_overlap).max(1);
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            let window: String = chars[start..end].iter().collect();

            if window.trim().chars().count() > self.min_chunk_len {
                let page = match &starts {
                    Some(starts) => page_at(starts, start),
                    None => (start / self.chars_per_page) as u32 + 1,
                };
                chunks.push(Chunk {
                    text: window,
                    page,
                    index: chunks.len(),
                    embedding: None,
                });
            }

            start += step;
        }

        chunks
    }
}
