use async_trait::async_trait;

/// External embedding generator. The production implementation is a remote
/// HTTP service; search code only depends on this trait.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Vector length this embedder produces. Must match the corpora's
    /// vector columns; a mismatch is a configuration error.
    fn dim(&self) -> usize;

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    async fn embed_single(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut vectors = self.embed_batch(&texts).await?;
        if vectors.is_empty() {
            anyhow::bail!("Embedding service returned no vectors");
        }
        Ok(vectors.remove(0))
    }
}
