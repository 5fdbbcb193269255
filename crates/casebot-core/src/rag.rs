//! RAG (Retrieval-Augmented Generation) result types

use serde::{Deserialize, Serialize};

/// How retrieval went for one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum RetrievalStatus {
    /// At least one document was retrieved
    Retrieved,
    /// The store answered but had no matches
    Empty,
    /// The store could not be queried; the answer was produced without context
    Failed(String),
}

impl RetrievalStatus {
    /// True when the answer was produced without any retrieved context
    pub fn is_degraded(&self) -> bool {
        !matches!(self, RetrievalStatus::Retrieved)
    }
}

/// Answer of the RAG pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    /// Raw contents of the retrieved documents, in retrieval order
    pub contexts: Vec<String>,
    pub retrieval: RetrievalStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_status() {
        assert!(!RetrievalStatus::Retrieved.is_degraded());
        assert!(RetrievalStatus::Empty.is_degraded());
        assert!(RetrievalStatus::Failed("down".into()).is_degraded());
    }

    #[test]
    fn test_answer_serialization() {
        let answer = Answer {
            answer: "Rest and ice.".to_string(),
            contexts: vec!["case 1".to_string()],
            retrieval: RetrievalStatus::Failed("connection refused".to_string()),
        };

        insta::assert_yaml_snapshot!(answer, @r#"
        answer: Rest and ice.
        contexts:
          - case 1
        retrieval:
          status: failed
          reason: connection refused
        "#);
    }
}
