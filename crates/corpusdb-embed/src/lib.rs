//! HTTP client for the external embedding service (a BGE-M3-style
//! `/encode` endpoint returning dense vectors).

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use corpusdb_core::config::EmbeddingConfig;
use corpusdb_core::traits::Embedder;

#[derive(Debug, Serialize)]
struct EncodeRequest<'a> {
    texts: &'a [String],
    return_dense: bool,
    return_sparse: bool,
    return_colbert_vecs: bool,
}

#[derive(Debug, Deserialize)]
struct EncodeResponse {
    dense_vecs: Option<Vec<Vec<f32>>>,
}

pub struct HttpEmbedder {
    client: reqwest::Client,
    base_url: String,
    dimension: usize,
}

impl HttpEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            dimension: config.dimension,
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn dim(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EncodeRequest {
            texts,
            return_dense: true,
            return_sparse: false,
            return_colbert_vecs: false,
        };

        let response = self
            .client
            .post(format!("{}/encode", self.base_url))
            .json(&request)
            .send()
            .await
            .context("Embedding service request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Embedding service error ({status}): {body}");
        }

        let data: EncodeResponse =
            response.json().await.context("Embedding service returned invalid JSON")?;
        let vectors = data
            .dense_vecs
            .context("No dense embeddings returned from embedding service")?;

        if vectors.len() != texts.len() {
            bail!(
                "Embedding service returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            );
        }
        for vector in &vectors {
            if vector.len() != self.dimension {
                // Configuration error, not a retryable condition.
                bail!(
                    "Embedding dimension mismatch: expected {}, got {}",
                    self.dimension,
                    vector.len()
                );
            }
        }

        tracing::debug!(texts = texts.len(), dim = self.dimension, "Embeddings generated");
        Ok(vectors)
    }
}
