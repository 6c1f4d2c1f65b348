//! Text embeddings via the Gemini embedding model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm_client::{Content, LlmClient, LlmError};

pub const EMBEDDING_MODEL: &str = "text-embedding-004";
/// The API caps batchEmbedContents at 100 requests.
const MAX_BATCH: usize = 100;

/// Sentence embeddings. Carried in `AppState` as `Arc<dyn Embedder>`.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;

    /// Embeds every text, preserving order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    content: Content<'a>,
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Embedding,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<Embedding>,
}

#[derive(Debug, Deserialize)]
struct Embedding {
    values: Vec<f32>,
}

fn model_path() -> String {
    format!("models/{EMBEDDING_MODEL}")
}

#[async_trait]
impl Embedder for LlmClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let model = model_path();
        let body = EmbedRequest {
            model: &model,
            content: Content::text(None, text),
        };
        let url = self.endpoint(EMBEDDING_MODEL, "embedContent");
        let response: EmbedResponse = self.post_json(&url, &body).await?;
        Ok(response.embedding.values)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        let model = model_path();
        let url = self.endpoint(EMBEDDING_MODEL, "batchEmbedContents");
        let mut vectors = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(MAX_BATCH) {
            let body = BatchEmbedRequest {
                requests: chunk
                    .iter()
                    .map(|text| EmbedRequest {
                        model: &model,
                        content: Content::text(None, text),
                    })
                    .collect(),
            };
            let response: BatchEmbedResponse = self.post_json(&url, &body).await?;
            if response.embeddings.len() != chunk.len() {
                return Err(LlmError::EmbeddingCount {
                    expected: chunk.len(),
                    actual: response.embeddings.len(),
                });
            }
            vectors.extend(response.embeddings.into_iter().map(|e| e.values));
            debug!("Embedded batch of {} texts", chunk.len());
        }

        Ok(vectors)
    }
}

/// Cosine similarity in [-1, 1]. Zero-length or mismatched vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
