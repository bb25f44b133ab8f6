//! Text chunking for embedding and retrieval.
//!
//! Documents and transcripts are split into overlapping, size-bounded chunks
//! by [`RecursiveSplitter`].

mod recursive;

pub use recursive::RecursiveSplitter;

use serde::{Deserialize, Serialize};

/// Separators tried from coarsest to finest: paragraph, line, sentence, word, character.
pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// A bounded slice of a source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content of this chunk.
    pub text: String,
    /// Identifier of the document (or video) the chunk was cut from.
    pub source_document_id: String,
    /// Position of this chunk in the document.
    pub sequence_index: usize,
    /// Byte offset where the chunk starts in the source text.
    pub start: usize,
    /// Byte offset just past the chunk's end in the source text.
    pub end: usize,
}

impl Chunk {
    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
