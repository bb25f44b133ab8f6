//! Index construction and nearest-chunk lookup.

use crate::chunking::Chunk;
use crate::embedding::Embedder;
use crate::error::{DocentError, Result};
use crate::vector_store::{SearchResult, VectorIndex};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Builds indexes and answers similarity queries with a single embedder.
///
/// Index construction and query embedding both go through the same
/// [`Embedder`], so every index a retriever builds is queried in the
/// embedding space it was built in.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Embed every chunk and build an index over them.
    #[instrument(skip(self, chunks), fields(chunks = chunks.len()))]
    pub async fn build_index(&self, chunks: Vec<Chunk>) -> Result<VectorIndex> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        debug!("Embedded {} chunks", embeddings.len());
        VectorIndex::build(chunks, embeddings)
    }

    /// The `k` chunks of `index` most similar to `question`, best first.
    #[instrument(skip(self, index))]
    pub async fn retrieve(
        &self,
        index: &VectorIndex,
        question: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        if question.trim().is_empty() {
            return Err(DocentError::InvalidInput("Question must not be empty".into()));
        }

        let query_embedding = self.embedder.embed(question).await?;
        let results = index.query(&query_embedding, k);

        debug!(
            hits = results.len(),
            top_score = results.first().map(|r| r.score),
            "Retrieved context"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::RecursiveSplitter;
    use crate::embedding::HashingEmbedder;
    use proptest::prelude::*;

    const LEASE: &str = "The tenant shall pay $500 monthly rent on the first of each month.\n\n\
        The landlord is responsible for repairs to the roof and plumbing.\n\n\
        Pets are not allowed on the premises without written consent.";

    async fn lease_index(retriever: &Retriever) -> VectorIndex {
        let chunks = RecursiveSplitter::new(80, 0).unwrap().split(LEASE, "lease_txt").unwrap();
        assert_eq!(chunks.len(), 3);
        retriever.build_index(chunks).await.unwrap()
    }

    #[tokio::test]
    async fn test_retrieve_ranks_relevant_chunk_first() {
        let retriever = Retriever::new(Arc::new(HashingEmbedder::new(512)));
        let index = lease_index(&retriever).await;

        let hits = retriever.retrieve(&index, "Who pays for plumbing repairs?", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].chunk.text.contains("plumbing"));
        assert!(hits.iter().all(|h| h.chunk.source_document_id == "lease_txt"));
    }

    #[tokio::test]
    async fn test_retrieve_clamps_k() {
        let retriever = Retriever::new(Arc::new(HashingEmbedder::new(512)));
        let index = lease_index(&retriever).await;

        let hits = retriever.retrieve(&index, "rent", 10).await.unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_question_is_invalid() {
        let retriever = Retriever::new(Arc::new(HashingEmbedder::new(64)));
        let index = lease_index(&retriever).await;

        let err = retriever.retrieve(&index, "   ", 3).await.unwrap_err();
        assert!(matches!(err, DocentError::InvalidInput(_)));
    }

    proptest! {
        #[test]
        fn prop_retrieve_returns_min_of_k_and_index_size(
            k in 0usize..8,
            question in "[a-z]{1,12}( [a-z]{1,12}){0,5}",
        ) {
            let retriever = Retriever::new(Arc::new(HashingEmbedder::new(128)));
            let hits = tokio_test::block_on(async {
                let index = lease_index(&retriever).await;
                retriever.retrieve(&index, &question, k).await
            })
            .unwrap();

            prop_assert_eq!(hits.len(), k.min(3));
            for pair in hits.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
        }
    }
}
