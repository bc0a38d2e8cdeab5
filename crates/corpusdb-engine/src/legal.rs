//! Hybrid lexical+vector search over the legal corpus.
//!
//! Both ranking legs fetch their own top-N over the same chunk table;
//! fusion runs here. A chunk missing from one leg keeps the sentinel
//! rank, so its contribution from that leg is effectively zero.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::{json, Value};
use sqlx::postgres::PgPool;
use uuid::Uuid;

use corpusdb_core::error::{Error, Result};
use corpusdb_core::types::{Corpus, LegalSearchOptions, Metadata, SearchResult, UNTITLED};
use corpusdb_store::queries::{self, DocumentMetadataRow, RankedChunkRow};
use corpusdb_store::vector_to_pg;

/// RRF smoothing offset. Fixed engine parameter, not user-configurable.
pub(crate) const RRF_K: f64 = 60.0;

/// Rank assigned to a chunk absent from one of the two legs.
pub(crate) const ABSENT_RANK: i64 = 999_999;

#[derive(Debug, Clone)]
pub(crate) struct FusedChunk {
    pub id: Uuid,
    pub doc_id: Uuid,
    pub chunk: String,
    pub metadata: Option<Value>,
    pub bm25_score: f64,
    pub vector_score: f64,
    pub rrf_score: f64,
}

pub(crate) async fn search(
    pool: &PgPool,
    query_text: &str,
    query_vector: &[f32],
    options: LegalSearchOptions,
) -> Result<Vec<SearchResult>> {
    let query_vec = vector_to_pg(query_vector);

    let (lexical, vector) = tokio::try_join!(
        queries::fetch_lexical_candidates(pool, query_text, options.top_k),
        queries::fetch_chunk_vector_candidates(pool, &query_vec, options.top_k),
    )
    .map_err(|e| Error::retrieval(Corpus::Legal, e))?;

    tracing::debug!(
        lexical = lexical.len(),
        vector = vector.len(),
        "Legal ranking legs fetched"
    );

    let fused = fuse(lexical, vector, options.min_score, options.top_k as usize);
    if fused.is_empty() {
        // Valid outcome: nothing matched or nothing cleared the floor.
        tracing::info!(results = 0, "Legal search complete");
        return Ok(Vec::new());
    }

    let doc_ids: Vec<Uuid> = fused.iter().map(|c| c.doc_id).collect();
    let doc_meta = queries::fetch_document_metadata(pool, &doc_ids)
        .await
        .map_err(|e| Error::retrieval(Corpus::Legal, e))?;
    let doc_meta: HashMap<Uuid, DocumentMetadataRow> =
        doc_meta.into_iter().map(|row| (row.id, row)).collect();

    tracing::info!(results = fused.len(), "Legal search complete");

    Ok(fused
        .into_iter()
        .map(|chunk| {
            let meta = doc_meta.get(&chunk.doc_id);
            assemble(chunk, meta)
        })
        .collect())
}

/// Reciprocal rank fusion of the two candidate lists.
///
/// Union by chunk id; fused = 1/(60+bm25_rank) + 1/(60+vector_rank) with
/// the sentinel rank for the absent leg. The floor is strict
/// (`> min_score`). Candidates are walked in first-seen order and sorted
/// stably, so equal scores keep a deterministic order.
pub(crate) fn fuse(
    lexical: Vec<RankedChunkRow>,
    vector: Vec<RankedChunkRow>,
    min_score: f64,
    top_k: usize,
) -> Vec<FusedChunk> {
    struct Legs {
        lexical: Option<RankedChunkRow>,
        vector: Option<RankedChunkRow>,
    }

    let mut order: Vec<Uuid> = Vec::with_capacity(lexical.len() + vector.len());
    let mut by_id: HashMap<Uuid, Legs> = HashMap::new();

    for row in lexical {
        let id = row.id;
        if !by_id.contains_key(&id) {
            order.push(id);
        }
        by_id.entry(id).or_insert(Legs { lexical: None, vector: None }).lexical = Some(row);
    }
    for row in vector {
        let id = row.id;
        if !by_id.contains_key(&id) {
            order.push(id);
        }
        by_id.entry(id).or_insert(Legs { lexical: None, vector: None }).vector = Some(row);
    }

    let mut fused: Vec<FusedChunk> = Vec::with_capacity(order.len());
    for id in order {
        let Some(legs) = by_id.remove(&id) else { continue };
        let bm25_rank = legs.lexical.as_ref().map_or(ABSENT_RANK, |r| r.rank);
        let vector_rank = legs.vector.as_ref().map_or(ABSENT_RANK, |r| r.rank);
        let bm25_score = legs.lexical.as_ref().map_or(0.0, |r| r.score);
        let vector_score = legs.vector.as_ref().map_or(0.0, |r| r.score);
        let rrf_score =
            1.0 / (RRF_K + bm25_rank as f64) + 1.0 / (RRF_K + vector_rank as f64);

        // Either leg carries the chunk body; they read the same row.
        let Some(row) = legs.lexical.or(legs.vector) else { continue };

        fused.push(FusedChunk {
            id,
            doc_id: row.doc_id,
            chunk: row.chunk,
            metadata: row.metadata,
            bm25_score,
            vector_score,
            rrf_score,
        });
    }

    fused.retain(|c| c.rrf_score > min_score);
    fused.sort_by(|a, b| {
        b.rrf_score.partial_cmp(&a.rrf_score).unwrap_or(Ordering::Equal)
    });
    fused.truncate(top_k);
    fused
}

fn assemble(chunk: FusedChunk, doc_meta: Option<&DocumentMetadataRow>) -> SearchResult {
    let title = doc_meta
        .and_then(|m| m.title.clone())
        .or_else(|| title_from_blob(chunk.metadata.as_ref()))
        .unwrap_or_else(|| UNTITLED.to_string());

    let mut metadata = Metadata::new();
    metadata.insert("docId".to_string(), json!(chunk.doc_id));
    metadata.insert(
        "docType".to_string(),
        doc_meta.and_then(|m| m.doc_type.clone()).map_or(Value::Null, Value::String),
    );
    metadata.insert(
        "docNumber".to_string(),
        doc_meta.and_then(|m| m.doc_number.clone()).map_or(Value::Null, Value::String),
    );
    metadata.insert(
        "sourceUrl".to_string(),
        doc_meta.and_then(|m| m.source_url.clone()).map_or(Value::Null, Value::String),
    );
    metadata.insert("bm25Score".to_string(), json!(chunk.bm25_score));
    metadata.insert("vectorScore".to_string(), json!(chunk.vector_score));

    SearchResult {
        title,
        text: chunk.chunk,
        similarity: chunk.rrf_score,
        metadata,
    }
}

/// Title fallback from the chunk's free-form metadata blob: its `title`
/// key if the blob is an object, otherwise the blob itself as a string.
fn title_from_blob(blob: Option<&Value>) -> Option<String> {
    let blob = blob?;
    if let Some(title) = blob.get("title").and_then(Value::as_str) {
        return Some(title.to_string());
    }
    match blob {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
