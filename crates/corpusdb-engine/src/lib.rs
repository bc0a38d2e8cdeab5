//! Hybrid retrieval engine over the two corpora.
//!
//! Two search paths share one result shape: a dense two-tier similarity
//! search for the ICD corpus and a lexical+vector search with reciprocal
//! rank fusion for the legal corpus. The engine holds no per-call state;
//! concurrent searches only share the connection pools.

pub mod context;
mod icd;
mod legal;

use std::sync::Arc;

use corpusdb_core::error::{Error, Result};
use corpusdb_core::types::{Corpus, IcdSearchOptions, LegalSearchOptions, SearchResult};
use corpusdb_store::PoolManager;

pub use context::ContextBuilder;

pub struct SearchEngine {
    pools: Arc<PoolManager>,
    dimension: usize,
}

impl SearchEngine {
    pub fn new(pools: Arc<PoolManager>, dimension: usize) -> Self {
        Self { pools, dimension }
    }

    /// Dense similarity search over ICD sections and subsections.
    ///
    /// Returns at most `options.limit` results, every one with
    /// `similarity >= options.min_score`, ordered by similarity
    /// descending with section rows before subsection rows on ties.
    pub async fn search_icd(
        &self,
        query_vector: &[f32],
        options: IcdSearchOptions,
    ) -> Result<Vec<SearchResult>> {
        self.check_dimension(query_vector)?;
        let pool = self.pools.get(Corpus::Icd).await;
        icd::search(&pool, query_vector, options).await
    }

    /// Hybrid lexical+vector search over legal-corpus content chunks.
    ///
    /// Returns at most `options.top_k` results, deduplicated by chunk,
    /// every one with a fused score strictly above `options.min_score`.
    /// An empty list is a valid outcome, not an error.
    pub async fn search_legal(
        &self,
        query_text: &str,
        query_vector: &[f32],
        options: LegalSearchOptions,
    ) -> Result<Vec<SearchResult>> {
        self.check_dimension(query_vector)?;
        let pool = self.pools.get(Corpus::Legal).await;
        legal::search(&pool, query_text, query_vector, options).await
    }

    /// Dispose all connection pools; used at process shutdown.
    pub async fn close_all(&self) {
        self.pools.close_all().await;
    }

    fn check_dimension(&self, query_vector: &[f32]) -> Result<()> {
        if query_vector.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: query_vector.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpusdb_core::config::Config;
    use figment::Figment;

    fn engine() -> SearchEngine {
        let config = Config::from_figment(&Figment::new()).expect("config");
        SearchEngine::new(Arc::new(PoolManager::new(config)), 4)
    }

    #[tokio::test]
    async fn wrong_dimension_fails_before_touching_the_store() {
        let engine = engine();
        let err = engine
            .search_icd(&[0.1, 0.2, 0.3], IcdSearchOptions::default())
            .await
            .expect_err("must fail");
        assert!(matches!(err, Error::DimensionMismatch { expected: 4, actual: 3 }));

        let err = engine
            .search_legal("запрос", &[0.0; 5], LegalSearchOptions::default())
            .await
            .expect_err("must fail");
        assert!(matches!(err, Error::DimensionMismatch { expected: 4, actual: 5 }));
    }
}
