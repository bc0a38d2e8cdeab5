//! Candidate-fetch queries for both search paths.
//!
//! Every query excludes rows with a null embedding at the SQL level and
//! returns at most `top_k` rows, already ordered by its own ranking.
//! Merging and fusion happen in the engine crate.

use sqlx::postgres::PgPool;
use uuid::Uuid;

/// One section- or subsection-tier candidate for the ICD dense path.
/// `subsection_id` is null for section rows. Title fallbacks are applied
/// in SQL so a row always carries a displayable title.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TierRow {
    pub document_id: Uuid,
    pub section_id: Uuid,
    pub subsection_id: Option<Uuid>,
    pub title: String,
    pub text: String,
    pub char_count: i32,
    pub similarity: f64,
    pub filename: Option<String>,
    pub doc_title: Option<String>,
}

/// One ranked content chunk from either legal-corpus ranking leg.
/// `rank` is 1-based within that leg.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RankedChunkRow {
    pub id: Uuid,
    pub doc_id: Uuid,
    pub chunk: String,
    pub metadata: Option<serde_json::Value>,
    pub score: f64,
    pub rank: i64,
}

/// Descriptive fields for one legal-corpus document.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentMetadataRow {
    pub id: Uuid,
    pub title: Option<String>,
    pub doc_type: Option<String>,
    pub doc_number: Option<String>,
    pub source_url: Option<String>,
}

const SECTION_SQL: &str = "\
SELECT
    s.document_id,
    s.id AS section_id,
    NULL::uuid AS subsection_id,
    COALESCE(s.title, s.section_label, 'Без названия') AS title,
    COALESCE(s.text, '') AS text,
    COALESCE(s.char_count, 0) AS char_count,
    (1 - (s.embedding <=> $1::text::vector))::float8 AS similarity,
    d.filename,
    d.title AS doc_title
FROM sections s
JOIN documents d ON s.document_id = d.id
WHERE s.embedding IS NOT NULL
ORDER BY s.embedding <=> $1::text::vector
LIMIT $2";

const SUBSECTION_SQL: &str = "\
SELECT
    ss.document_id,
    ss.section_id,
    ss.id AS subsection_id,
    COALESCE(ss.title, 'Подраздел') AS title,
    COALESCE(ss.text, '') AS text,
    COALESCE(ss.char_count, 0) AS char_count,
    (1 - (ss.embedding <=> $1::text::vector))::float8 AS similarity,
    d.filename,
    d.title AS doc_title
FROM subsections ss
JOIN documents d ON ss.document_id = d.id
WHERE ss.embedding IS NOT NULL
ORDER BY ss.embedding <=> $1::text::vector
LIMIT $2";

// The tsquery language is fixed to 'russian' regardless of the query's
// actual language; see DESIGN.md. Non-Russian queries still reach results
// through the vector leg.
const BM25_SQL: &str = "\
SELECT
    c.id,
    c.doc_id,
    c.chunk,
    c.metadata,
    ts_rank_cd(c.chunk_tsv, plainto_tsquery('russian', $1))::float8 AS score,
    ROW_NUMBER() OVER (
        ORDER BY ts_rank_cd(c.chunk_tsv, plainto_tsquery('russian', $1)) DESC
    ) AS rank
FROM content_chunks c
WHERE c.chunk_tsv @@ plainto_tsquery('russian', $1)
ORDER BY score DESC
LIMIT $2";

const CHUNK_VECTOR_SQL: &str = "\
SELECT
    c.id,
    c.doc_id,
    c.chunk,
    c.metadata,
    (1 - (c.embedding <=> $1::text::vector))::float8 AS score,
    ROW_NUMBER() OVER (ORDER BY c.embedding <=> $1::text::vector) AS rank
FROM content_chunks c
WHERE c.embedding IS NOT NULL
ORDER BY c.embedding <=> $1::text::vector
LIMIT $2";

const DOCUMENT_METADATA_SQL: &str = "\
SELECT m.id, m.title, m.doc_type, m.doc_number, m.source_url
FROM document_metadata m
WHERE m.id = ANY($1)";

/// Best `top_k` sections by vector distance to the encoded query vector.
pub async fn fetch_section_candidates(
    pool: &PgPool,
    query_vec: &str,
    top_k: i64,
) -> Result<Vec<TierRow>, sqlx::Error> {
    sqlx::query_as::<_, TierRow>(SECTION_SQL)
        .bind(query_vec)
        .bind(top_k)
        .fetch_all(pool)
        .await
}

/// Best `top_k` subsections by vector distance to the encoded query vector.
pub async fn fetch_subsection_candidates(
    pool: &PgPool,
    query_vec: &str,
    top_k: i64,
) -> Result<Vec<TierRow>, sqlx::Error> {
    sqlx::query_as::<_, TierRow>(SUBSECTION_SQL)
        .bind(query_vec)
        .bind(top_k)
        .fetch_all(pool)
        .await
}

/// Best `top_k` chunks by lexical relevance to the raw query text.
pub async fn fetch_lexical_candidates(
    pool: &PgPool,
    query_text: &str,
    top_k: i64,
) -> Result<Vec<RankedChunkRow>, sqlx::Error> {
    sqlx::query_as::<_, RankedChunkRow>(BM25_SQL)
        .bind(query_text)
        .bind(top_k)
        .fetch_all(pool)
        .await
}

/// Best `top_k` chunks by vector distance to the encoded query vector.
pub async fn fetch_chunk_vector_candidates(
    pool: &PgPool,
    query_vec: &str,
    top_k: i64,
) -> Result<Vec<RankedChunkRow>, sqlx::Error> {
    sqlx::query_as::<_, RankedChunkRow>(CHUNK_VECTOR_SQL)
        .bind(query_vec)
        .bind(top_k)
        .fetch_all(pool)
        .await
}

/// Descriptive metadata for the given legal-corpus documents.
pub async fn fetch_document_metadata(
    pool: &PgPool,
    doc_ids: &[Uuid],
) -> Result<Vec<DocumentMetadataRow>, sqlx::Error> {
    if doc_ids.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_as::<_, DocumentMetadataRow>(DOCUMENT_METADATA_SQL)
        .bind(doc_ids)
        .fetch_all(pool)
        .await
}
