//! Domain types shared by the store and the search engine.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Fallback title used when a content unit carries no usable title.
pub const UNTITLED: &str = "Без названия";

/// Which corpus a search runs against.
///
/// `Icd` is the internal normative document corpus (sections and
/// subsections per document). `Legal` is the external legal-acts corpus
/// (flat content chunks with lexical and vector ranking support).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corpus {
    Icd,
    Legal,
}

impl fmt::Display for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Corpus::Icd => write!(f, "ICD"),
            Corpus::Legal => write!(f, "legal"),
        }
    }
}

/// Granularity of an ICD content unit.
///
/// On equal similarity, section rows sort before subsection rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Section,
    Subsection,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Section => "section",
            Tier::Subsection => "subsection",
        }
    }

    /// Sort key for the tie-break: lower sorts first.
    pub fn order(self) -> u8 {
        match self {
            Tier::Section => 1,
            Tier::Subsection => 2,
        }
    }
}

/// The one shape every search path returns.
///
/// `similarity` is "higher is better" regardless of path: a cosine-derived
/// value in [0, 1] for the dense ICD path, a reciprocal-rank-fusion sum
/// (no fixed upper bound) for the legal path. `metadata` is a flat map
/// whose key set differs by path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub text: String,
    pub similarity: f64,
    pub metadata: Metadata,
}

/// Options for the dense ICD search.
#[derive(Debug, Clone, Copy)]
pub struct IcdSearchOptions {
    /// Candidate count fetched per tier.
    pub top_k: i64,
    /// Inclusive similarity floor.
    pub min_score: f64,
    /// Cap on the merged result list.
    pub limit: usize,
}

impl Default for IcdSearchOptions {
    fn default() -> Self {
        Self { top_k: 8, min_score: 0.3, limit: 12 }
    }
}

/// Options for the hybrid legal-corpus search.
#[derive(Debug, Clone, Copy)]
pub struct LegalSearchOptions {
    /// Candidate count per ranking leg, and the final result cap.
    pub top_k: i64,
    /// Exclusive fused-score floor.
    pub min_score: f64,
}

impl Default for LegalSearchOptions {
    fn default() -> Self {
        Self { top_k: 10, min_score: 0.3 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icd_option_defaults() {
        let opts = IcdSearchOptions::default();
        assert_eq!(opts.top_k, 8);
        assert_eq!(opts.min_score, 0.3);
        assert_eq!(opts.limit, 12);
    }

    #[test]
    fn legal_option_defaults() {
        let opts = LegalSearchOptions::default();
        assert_eq!(opts.top_k, 10);
        assert_eq!(opts.min_score, 0.3);
    }

    #[test]
    fn section_sorts_before_subsection() {
        assert!(Tier::Section.order() < Tier::Subsection.order());
    }

    #[test]
    fn corpus_display_matches_error_wording() {
        assert_eq!(Corpus::Icd.to_string(), "ICD");
        assert_eq!(Corpus::Legal.to_string(), "legal");
    }
}
