//! Recursive separator-based splitting.
//!
//! Text is cut on the coarsest separator present; only pieces that are still
//! longer than the chunk size are cut again with the next separator. Small
//! pieces are then merged back into windows of at most `chunk_size`
//! characters, each window starting with up to `chunk_overlap` characters of
//! the previous one.

use super::{Chunk, DEFAULT_SEPARATORS};
use crate::config::ChunkingSettings;
use crate::error::{DocentError, Result};
use std::collections::VecDeque;
use tracing::debug;

/// A contiguous byte range of the source text and its length in characters.
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
    chars: usize,
}

impl Span {
    fn new(text: &str, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            chars: text[start..end].chars().count(),
        }
    }
}

/// Splits text on a preference-ordered list of separators.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    /// Create a splitter with the default separators.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(DocentError::InvalidInput("chunk size must be positive".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(DocentError::InvalidInput(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Create a splitter from configuration.
    pub fn from_settings(settings: &ChunkingSettings) -> Result<Self> {
        Self::new(settings.chunk_size, settings.chunk_overlap)?
            .with_separators(settings.separators.clone())
    }

    /// Replace the separator list (coarsest first).
    ///
    /// Without a trailing empty separator, a piece that contains none of the
    /// separators is kept whole even when it exceeds the chunk size.
    pub fn with_separators(mut self, separators: Vec<String>) -> Result<Self> {
        if separators.is_empty() {
            return Err(DocentError::InvalidInput("at least one separator is required".into()));
        }
        self.separators = separators;
        Ok(self)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into ordered chunks attributed to `document_id`.
    pub fn split(&self, text: &str, document_id: &str) -> Result<Vec<Chunk>> {
        if text.trim().is_empty() {
            return Err(DocentError::EmptyInput);
        }

        let whole = Span::new(text, 0, text.len());
        let chunks: Vec<Chunk> = self
            .split_span(text, whole, &self.separators)
            .into_iter()
            .filter(|span| !text[span.start..span.end].trim().is_empty())
            .enumerate()
            .map(|(sequence_index, span)| Chunk {
                text: text[span.start..span.end].to_string(),
                source_document_id: document_id.to_string(),
                sequence_index,
                start: span.start,
                end: span.end,
            })
            .collect();

        debug!(
            document_id,
            chunks = chunks.len(),
            "Split {} characters",
            text.chars().count()
        );
        Ok(chunks)
    }

    fn split_span(&self, text: &str, span: Span, separators: &[String]) -> Vec<Span> {
        let slice = &text[span.start..span.end];

        let Some(index) = separators
            .iter()
            .position(|sep| sep.is_empty() || slice.contains(sep.as_str()))
        else {
            return vec![span];
        };
        let remaining = &separators[index + 1..];

        let mut out = Vec::new();
        let mut pending: Vec<Span> = Vec::new();

        for piece in split_pieces(text, span, &separators[index]) {
            if piece.chars <= self.chunk_size {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                out.extend(self.merge(&pending));
                pending.clear();
            }

            if remaining.is_empty() {
                out.push(piece);
            } else {
                out.extend(self.split_span(text, piece, remaining));
            }
        }

        if !pending.is_empty() {
            out.extend(self.merge(&pending));
        }

        out
    }

    /// Merge contiguous small pieces into overlapping windows.
    fn merge(&self, pieces: &[Span]) -> Vec<Span> {
        let mut out = Vec::new();
        let mut window: VecDeque<Span> = VecDeque::new();
        let mut total = 0;

        for &piece in pieces {
            if total + piece.chars > self.chunk_size && !window.is_empty() {
                out.push(covering(&window, total));

                while total > self.chunk_overlap
                    || (total + piece.chars > self.chunk_size && total > 0)
                {
                    match window.pop_front() {
                        Some(dropped) => total -= dropped.chars,
                        None => break,
                    }
                }
            }

            total += piece.chars;
            window.push_back(piece);
        }

        if !window.is_empty() {
            out.push(covering(&window, total));
        }

        out
    }
}

/// Span from the first to the last piece of a contiguous window.
fn covering(window: &VecDeque<Span>, chars: usize) -> Span {
    let start = window.front().map_or(0, |s| s.start);
    let end = window.back().map_or(start, |s| s.end);
    Span { start, end, chars }
}

/// Cut a span at every occurrence of `separator`, keeping the separator at the
/// end of the preceding piece. An empty separator yields single characters.
fn split_pieces(text: &str, span: Span, separator: &str) -> Vec<Span> {
    let slice = &text[span.start..span.end];

    if separator.is_empty() {
        return slice
            .char_indices()
            .map(|(i, c)| Span {
                start: span.start + i,
                end: span.start + i + c.len_utf8(),
                chars: 1,
            })
            .collect();
    }

    let mut pieces = Vec::new();
    let mut piece_start = 0;

    for (pos, matched) in slice.match_indices(separator) {
        let piece_end = pos + matched.len();
        pieces.push(Span::new(text, span.start + piece_start, span.start + piece_end));
        piece_start = piece_end;
    }

    if piece_start < slice.len() {
        pieces.push(Span::new(text, span.start + piece_start, span.end));
    }

    pieces
}
