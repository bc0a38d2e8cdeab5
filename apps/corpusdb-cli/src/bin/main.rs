use std::env;
use std::sync::Arc;

use corpusdb_core::config::Config;
use corpusdb_core::traits::Embedder;
use corpusdb_core::types::{IcdSearchOptions, LegalSearchOptions, SearchResult};
use corpusdb_embed::HttpEmbedder;
use corpusdb_engine::{ContextBuilder, SearchEngine};
use corpusdb_store::PoolManager;
use tracing_subscriber::EnvFilter;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {} <icd|legal> \"<query>\"", prog);
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn print_results(results: &[SearchResult]) {
    if results.is_empty() {
        println!("No results above threshold.");
        return;
    }
    for (i, result) in results.iter().enumerate() {
        println!("{}. {} (score {:.4})", i + 1, result.title, result.similarity);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let (cmd, args) = parse_args();

    let pools = Arc::new(PoolManager::new(config.clone()));
    let engine = SearchEngine::new(pools.clone(), config.embedding.dimension);
    let embedder = HttpEmbedder::new(&config.embedding);
    let context_builder = ContextBuilder::default();

    match cmd.as_str() {
        "icd" => {
            let query = args.first().cloned().unwrap_or_else(|| {
                eprintln!("Usage: corpusdb-search icd \"<query>\"");
                std::process::exit(1)
            });
            let query_vector = embedder.embed_single(&query).await?;
            let results = engine.search_icd(&query_vector, IcdSearchOptions::default()).await?;
            print_results(&results);
            if !results.is_empty() {
                println!("\n--- prompt context ---\n{}", context_builder.build(&results));
            }
        }
        "legal" => {
            let query = args.first().cloned().unwrap_or_else(|| {
                eprintln!("Usage: corpusdb-search legal \"<query>\"");
                std::process::exit(1)
            });
            let query_vector = embedder.embed_single(&query).await?;
            let results = engine
                .search_legal(&query, &query_vector, LegalSearchOptions::default())
                .await?;
            print_results(&results);
            if !results.is_empty() {
                println!("\n--- prompt context ---\n{}", context_builder.build(&results));
            }
        }
        other => {
            eprintln!("Unknown command '{}'; expected icd or legal", other);
            std::process::exit(1);
        }
    }

    pools.close_all().await;
    Ok(())
}
