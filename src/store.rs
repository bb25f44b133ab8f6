//! Registry of ingested documents.
//!
//! The store is constructed at service start and handed to whoever needs it;
//! it lives as long as the process and keeps nothing on disk.

use crate::error::{DocentError, Result};
use crate::vector_store::VectorIndex;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// An ingested document. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Identifier derived from the filename.
    pub id: String,
    /// Original filename.
    pub filename: String,
    /// Full extracted text.
    pub raw_text: String,
    /// Text length in characters.
    pub length: usize,
    /// Number of chunks indexed for this document.
    pub chunk_count: usize,
    /// When the document was ingested.
    pub ingested_at: DateTime<Utc>,
}

impl Document {
    pub fn new(id: String, filename: String, raw_text: String, chunk_count: usize) -> Self {
        Self {
            length: raw_text.chars().count(),
            id,
            filename,
            raw_text,
            chunk_count,
            ingested_at: Utc::now(),
        }
    }

    pub fn info(&self) -> DocumentInfo {
        DocumentInfo {
            document_id: self.id.clone(),
            filename: self.filename.clone(),
            text_length: self.length,
            num_chunks: self.chunk_count,
            ingested_at: self.ingested_at,
        }
    }
}

/// Listing entry for an ingested document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub document_id: String,
    pub filename: String,
    pub text_length: usize,
    pub num_chunks: usize,
    pub ingested_at: DateTime<Utc>,
}

/// A document and the index built from it.
#[derive(Debug)]
pub struct StoredDocument {
    pub document: Document,
    pub index: VectorIndex,
}

/// Process-lifetime map from document id to its stored state.
///
/// Entries are replaced whole, so a reader holding an `Arc<StoredDocument>`
/// keeps a complete document and index even while the id is re-ingested.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: RwLock<HashMap<String, Arc<StoredDocument>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `document.id`.
    pub fn put(&self, document: Document, index: VectorIndex) -> Arc<StoredDocument> {
        let id = document.id.clone();
        let stored = Arc::new(StoredDocument { document, index });
        let replaced = self.write().insert(id.clone(), stored.clone()).is_some();
        debug!(document_id = %id, replaced, "Stored document");
        stored
    }

    pub fn get(&self, id: &str) -> Result<Arc<StoredDocument>> {
        self.read()
            .get(id)
            .cloned()
            .ok_or_else(|| DocentError::NotFound(format!("Document not found: {}", id)))
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        match self.write().remove(id) {
            Some(_) => {
                debug!(document_id = %id, "Deleted document");
                Ok(())
            }
            None => Err(DocentError::NotFound(format!("Document not found: {}", id))),
        }
    }

    /// Metadata of every stored document, ordered by id.
    pub fn list(&self) -> Vec<DocumentInfo> {
        let mut infos: Vec<DocumentInfo> =
            self.read().values().map(|s| s.document.info()).collect();
        infos.sort_by(|a, b| a.document_id.cmp(&b.document_id));
        infos
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Every mutation is a single insert or remove; a poisoned map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<StoredDocument>>> {
        self.documents.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<StoredDocument>>> {
        self.documents.write().unwrap_or_else(|e| e.into_inner())
    }
}
