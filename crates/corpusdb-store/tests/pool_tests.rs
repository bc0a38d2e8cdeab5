use corpusdb_core::config::Config;
use corpusdb_core::types::Corpus;
use corpusdb_store::PoolManager;
use figment::Figment;

fn test_config() -> Config {
    Config::from_figment(&Figment::new()).expect("default config")
}

// Pool construction is lazy, so none of these touch a real server.

#[tokio::test]
async fn get_returns_handles_to_the_same_pool() {
    let manager = PoolManager::new(test_config());

    let first = manager.get(Corpus::Icd).await;
    let second = manager.get(Corpus::Icd).await;

    // Closing through one handle closes the other: both wrap one pool.
    first.close().await;
    assert!(second.is_closed());
}

#[tokio::test]
async fn pools_are_per_corpus() {
    let manager = PoolManager::new(test_config());

    let icd = manager.get(Corpus::Icd).await;
    let legal = manager.get(Corpus::Legal).await;

    icd.close().await;
    assert!(icd.is_closed());
    assert!(!legal.is_closed());
}

#[tokio::test]
async fn close_all_disposes_every_pool() {
    let manager = PoolManager::new(test_config());

    let icd = manager.get(Corpus::Icd).await;
    let legal = manager.get(Corpus::Legal).await;

    manager.close_all().await;
    assert!(icd.is_closed());
    assert!(legal.is_closed());

    // A later get starts over with a fresh pool.
    let fresh = manager.get(Corpus::Icd).await;
    assert!(!fresh.is_closed());
}

#[tokio::test]
async fn concurrent_gets_share_one_pool() {
    let manager = std::sync::Arc::new(PoolManager::new(test_config()));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.get(Corpus::Legal).await })
        })
        .collect();

    let mut pools = Vec::new();
    for task in tasks {
        pools.push(task.await.expect("join"));
    }

    pools[0].close().await;
    for pool in &pools {
        assert!(pool.is_closed());
    }
}
