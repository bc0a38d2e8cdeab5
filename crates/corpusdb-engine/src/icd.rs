//! Dense similarity search over the ICD corpus.
//!
//! Sections and subsections are ranked independently by vector distance,
//! `top_k` per tier, then merged here: inclusive similarity floor, best
//! first, section tier preferred on ties, larger text next.

use std::cmp::Ordering;

use serde_json::{json, Value};
use sqlx::postgres::PgPool;
use uuid::Uuid;

use corpusdb_core::error::{Error, Result};
use corpusdb_core::types::{Corpus, IcdSearchOptions, Metadata, SearchResult, Tier};
use corpusdb_store::queries::{self, TierRow};
use corpusdb_store::vector_to_pg;

#[derive(Debug, Clone)]
pub(crate) struct TierCandidate {
    pub tier: Tier,
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

impl TierCandidate {
    fn from_row(tier: Tier, row: TierRow) -> Self {
        Self {
            tier,
            document_id: row.document_id,
            section_id: row.section_id,
            subsection_id: row.subsection_id,
            title: row.title,
            text: row.text,
            char_count: row.char_count,
            similarity: row.similarity,
            filename: row.filename,
            doc_title: row.doc_title,
        }
    }

    fn into_result(self) -> SearchResult {
        let mut metadata = Metadata::new();
        metadata.insert("level".to_string(), json!(self.tier.as_str()));
        metadata.insert("documentId".to_string(), json!(self.document_id));
        metadata.insert("sectionId".to_string(), json!(self.section_id));
        metadata.insert(
            "subsectionId".to_string(),
            self.subsection_id.map_or(Value::Null, |id| json!(id)),
        );
        metadata.insert(
            "filename".to_string(),
            self.filename.map_or(Value::Null, Value::String),
        );
        metadata.insert(
            "docTitle".to_string(),
            self.doc_title.map_or(Value::Null, Value::String),
        );

        SearchResult {
            title: self.title,
            text: self.text,
            similarity: self.similarity,
            metadata,
        }
    }
}

pub(crate) async fn search(
    pool: &PgPool,
    query_vector: &[f32],
    options: IcdSearchOptions,
) -> Result<Vec<SearchResult>> {
    let query_vec = vector_to_pg(query_vector);

    let (sections, subsections) = tokio::try_join!(
        queries::fetch_section_candidates(pool, &query_vec, options.top_k),
        queries::fetch_subsection_candidates(pool, &query_vec, options.top_k),
    )
    .map_err(|e| Error::retrieval(Corpus::Icd, e))?;

    tracing::debug!(
        sections = sections.len(),
        subsections = subsections.len(),
        "ICD tier candidates fetched"
    );

    let candidates = sections
        .into_iter()
        .map(|row| TierCandidate::from_row(Tier::Section, row))
        .chain(
            subsections
                .into_iter()
                .map(|row| TierCandidate::from_row(Tier::Subsection, row)),
        )
        .collect();

    let ranked = rank_candidates(candidates, options.min_score, options.limit);
    tracing::info!(results = ranked.len(), "ICD search complete");

    Ok(ranked.into_iter().map(TierCandidate::into_result).collect())
}

/// Merge both tiers into the final ordering. The floor is inclusive
/// (`>= min_score`); ties break to the section tier, then to the larger
/// character count.
pub(crate) fn rank_candidates(
    mut candidates: Vec<TierCandidate>,
    min_score: f64,
    limit: usize,
) -> Vec<TierCandidate> {
    candidates.retain(|c| c.similarity >= min_score);
    candidates.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.tier.order().cmp(&b.tier.order()))
            .then_with(|| b.char_count.cmp(&a.char_count))
    });
    candidates.truncate(limit);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(tier: Tier, similarity: f64, char_count: i32) -> TierCandidate {
        TierCandidate {
            tier,
            document_id: Uuid::new_v4(),
            section_id: Uuid::new_v4(),
            subsection_id: (tier == Tier::Subsection).then(Uuid::new_v4),
            title: "Раздел 1".to_string(),
            text: "текст".to_string(),
            char_count,
            similarity,
            filename: Some("doc.pdf".to_string()),
            doc_title: Some("Документ".to_string()),
        }
    }

    #[test]
    fn orders_by_similarity_descending() {
        let ranked = rank_candidates(
            vec![
                candidate(Tier::Section, 0.5, 100),
                candidate(Tier::Section, 0.9, 100),
                candidate(Tier::Subsection, 0.7, 100),
            ],
            0.3,
            12,
        );
        let scores: Vec<f64> = ranked.iter().map(|c| c.similarity).collect();
        assert_eq!(scores, vec![0.9, 0.7, 0.5]);
    }

    #[test]
    fn floor_is_inclusive() {
        let ranked = rank_candidates(
            vec![
                candidate(Tier::Section, 0.3, 100),
                candidate(Tier::Section, 0.29999, 100),
            ],
            0.3,
            12,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].similarity, 0.3);
    }

    #[test]
    fn equal_scores_prefer_section_tier() {
        let ranked = rank_candidates(
            vec![
                candidate(Tier::Subsection, 0.8, 500),
                candidate(Tier::Section, 0.8, 100),
            ],
            0.3,
            12,
        );
        assert_eq!(ranked[0].tier, Tier::Section);
        assert_eq!(ranked[1].tier, Tier::Subsection);
    }

    #[test]
    fn equal_score_and_tier_prefer_larger_text() {
        let ranked = rank_candidates(
            vec![
                candidate(Tier::Section, 0.8, 100),
                candidate(Tier::Section, 0.8, 900),
            ],
            0.3,
            12,
        );
        assert_eq!(ranked[0].char_count, 900);
    }

    #[test]
    fn limit_caps_the_merged_list() {
        // Spec scenario: three sections at [0.9, 0.5, 0.31], limit 2.
        let ranked = rank_candidates(
            vec![
                candidate(Tier::Section, 0.9, 100),
                candidate(Tier::Section, 0.5, 100),
                candidate(Tier::Section, 0.31, 100),
            ],
            0.3,
            2,
        );
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].similarity, 0.9);
        assert_eq!(ranked[1].similarity, 0.5);
    }

    #[test]
    fn nothing_above_floor_yields_empty() {
        let ranked = rank_candidates(
            vec![
                candidate(Tier::Section, 0.1, 100),
                candidate(Tier::Subsection, 0.2, 100),
            ],
            0.3,
            12,
        );
        assert!(ranked.is_empty());
    }

    #[test]
    fn ranking_is_idempotent() {
        let input = vec![
            candidate(Tier::Subsection, 0.8, 300),
            candidate(Tier::Section, 0.8, 300),
            candidate(Tier::Section, 0.5, 100),
            candidate(Tier::Section, 0.9, 200),
        ];
        let first = rank_candidates(input.clone(), 0.3, 12);
        let second = rank_candidates(input, 0.3, 12);
        let ids = |v: &[TierCandidate]| -> Vec<Uuid> { v.iter().map(|c| c.section_id).collect() };
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn result_metadata_carries_tier_and_ids() {
        let c = candidate(Tier::Subsection, 0.8, 100);
        let subsection_id = c.subsection_id;
        let result = c.into_result();
        assert_eq!(result.metadata["level"], json!("subsection"));
        assert_eq!(result.metadata["subsectionId"], json!(subsection_id));
        assert_eq!(result.metadata["filename"], json!("doc.pdf"));
    }

    #[test]
    fn section_result_has_null_subsection_id() {
        let result = candidate(Tier::Section, 0.8, 100).into_result();
        assert_eq!(result.metadata["subsectionId"], Value::Null);
    }
}
