//! Best-practice retrieval: nearest-neighbour search over a fixed reference corpus.
//!
//! The index is built once at startup (every corpus document embedded in
//! batches) and shared read-only through `Arc`. Queries embed the candidate's
//! answer and rank documents by cosine similarity.

pub mod corpus;

use std::sync::Arc;

use tracing::debug;

use crate::llm_client::embeddings::cosine_similarity;
use crate::llm_client::{Embedder, LlmError};

/// Number of snippets fed into each follow-up prompt.
pub const SNIPPETS_PER_QUERY: usize = 3;

struct IndexedDocument {
    text: String,
    embedding: Vec<f32>,
}

pub struct BestPracticeIndex {
    documents: Vec<IndexedDocument>,
    embedder: Arc<dyn Embedder>,
}

impl BestPracticeIndex {
    /// Embeds every document up front.
    pub async fn build(documents: Vec<String>, embedder: Arc<dyn Embedder>) -> Result<Self, LlmError> {
        let embeddings = embedder.embed_batch(&documents).await?;
        if embeddings.len() != documents.len() {
            return Err(LlmError::EmbeddingCount {
                expected: documents.len(),
                actual: embeddings.len(),
            });
        }

        let documents: Vec<IndexedDocument> = documents
            .into_iter()
            .zip(embeddings)
            .map(|(text, embedding)| IndexedDocument { text, embedding })
            .collect();

        debug!("Embedded {} best-practice documents", documents.len());
        Ok(Self {
            documents,
            embedder,
        })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns up to `k` document texts most similar to `query`, best first.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>, LlmError> {
        if self.documents.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let query_embedding = self.embedder.embed(query).await?;
        Ok(self.nearest(&query_embedding, k))
    }

    fn nearest(&self, query: &[f32], k: usize) -> Vec<String> {
        let mut scored: Vec<(f32, &IndexedDocument)> = self
            .documents
            .iter()
            .map(|doc| (cosine_similarity(query, &doc.embedding), doc))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored
            .into_iter()
            .take(k)
            .map(|(_, doc)| doc.text.clone())
            .collect()
    }
}
