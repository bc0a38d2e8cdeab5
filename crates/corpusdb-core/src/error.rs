use thiserror::Error;

use crate::types::Corpus;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A datastore failure wrapped with the corpus it hit. No partial
    /// results accompany this; a search either returns fully or fails.
    #[error("{corpus} retrieval failed")]
    Retrieval {
        corpus: Corpus,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl Error {
    pub fn retrieval(
        corpus: Corpus,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Retrieval { corpus, source: Box::new(source) }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Refused;

    impl fmt::Display for Refused {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "connection refused")
        }
    }

    impl std::error::Error for Refused {}

    #[test]
    fn retrieval_error_names_the_corpus() {
        let err = Error::retrieval(Corpus::Icd, Refused);
        assert_eq!(err.to_string(), "ICD retrieval failed");
        let err = Error::retrieval(Corpus::Legal, Refused);
        assert_eq!(err.to_string(), "legal retrieval failed");
    }

    #[test]
    fn retrieval_error_keeps_the_cause() {
        let err = Error::retrieval(Corpus::Legal, Refused);
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "connection refused");
    }
}
