//! One lazily created connection pool per corpus.
//!
//! Pools are built on first use and reused for the life of the process.
//! Construction is lazy at the connection level too: a bad host or
//! password surfaces at the first query, on the search call that
//! triggered pool use.

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

use corpusdb_core::config::{Config, CorpusConfig};
use corpusdb_core::types::Corpus;

pub struct PoolManager {
    config: Config,
    pools: Mutex<HashMap<Corpus, PgPool>>,
}

impl PoolManager {
    pub fn new(config: Config) -> Self {
        Self { config, pools: Mutex::new(HashMap::new()) }
    }

    /// Return the pool for `corpus`, creating it on first call.
    /// `PgPool` is a cheap handle; clones share the same pool.
    pub async fn get(&self, corpus: Corpus) -> PgPool {
        let mut pools = self.pools.lock().await;
        if let Some(pool) = pools.get(&corpus) {
            return pool.clone();
        }

        let corpus_config = match corpus {
            Corpus::Icd => &self.config.icd,
            Corpus::Legal => &self.config.legal,
        };
        tracing::info!(
            %corpus,
            host = %corpus_config.host,
            database = %corpus_config.database,
            max_connections = corpus_config.max_connections,
            "Creating connection pool"
        );
        let pool = build_pool(corpus_config);
        pools.insert(corpus, pool.clone());
        pool
    }

    /// Close and drop every held pool. Used at process shutdown; a later
    /// `get` would start over with a fresh pool.
    pub async fn close_all(&self) {
        let mut pools = self.pools.lock().await;
        for (corpus, pool) in pools.drain() {
            tracing::info!(%corpus, "Closing connection pool");
            pool.close().await;
        }
    }
}

fn build_pool(config: &CorpusConfig) -> PgPool {
    let connect = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.user)
        .password(&config.password);

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_lazy_with(connect)
}
