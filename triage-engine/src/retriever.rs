use std::sync::Arc;

use triage_vector::filter::FilterExpr;
use triage_vector::index::CaseIndex;
use triage_vector::types::ScoredHit;

use crate::error::EngineError;
use crate::inference::Embedder;

/// Retrieves the nearest historical cases for a question, narrowed by
/// exact-match device constraints. Read-only against a shared index;
/// safe to call from any number of concurrent callers.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<CaseIndex>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<CaseIndex>) -> Self {
        Self { embedder, index }
    }

    /// Build the search filter from whichever constraints are present.
    /// Blank or whitespace-only values are treated as absent, so the
    /// resulting shape is always one the index accepts (none, bare
    /// clause, or AND of two).
    fn build_filter(model_type: Option<&str>, sw_version: Option<&str>) -> Option<FilterExpr> {
        let mut constraints = Vec::new();
        for (key, value) in [("model_type", model_type), ("sw_version", sw_version)] {
            if let Some(v) = value {
                let v = v.trim();
                if !v.is_empty() {
                    constraints.push((key.to_string(), v.to_string()));
                }
            }
        }
        FilterExpr::from_constraints(constraints)
    }

    /// Embed the question and search the index. Hits come back ascending
    /// by distance, at most `k`. An empty result is a valid outcome — a
    /// brand-new model_type simply has no history yet.
    pub fn retrieve(
        &self,
        question: &str,
        model_type: Option<&str>,
        sw_version: Option<&str>,
        k: usize,
    ) -> Result<Vec<ScoredHit>, EngineError> {
        let filter = Self::build_filter(model_type, sw_version);

        let query = vec![question.to_string()];
        let mut embeddings = self.embedder.embed(&query)?;
        let query_embedding = embeddings.pop().ok_or_else(|| {
            EngineError::EmbeddingUnavailable("backend returned no embedding for the query".into())
        })?;

        let hits = self.index.search(&query_embedding, k, filter.as_ref());
        tracing::debug!(
            hits = hits.len(),
            k,
            filter = %filter.as_ref().map_or_else(|| "none".to_string(), |f| f.to_json().to_string()),
            "Retrieved cases"
        );
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_constraints_build_no_filter() {
        assert_eq!(Retriever::build_filter(None, None), None);
        assert_eq!(Retriever::build_filter(Some("  "), Some("")), None);
    }

    #[test]
    fn single_constraint_builds_bare_clause() {
        let f = Retriever::build_filter(Some("X300-Pro"), None).unwrap();
        assert_eq!(f, FilterExpr::eq("model_type", "X300-Pro"));
        let f = Retriever::build_filter(None, Some("V2.3.1")).unwrap();
        assert_eq!(f, FilterExpr::eq("sw_version", "V2.3.1"));
    }

    #[test]
    fn both_constraints_build_a_conjunction() {
        let f = Retriever::build_filter(Some("X300-Pro"), Some("V2.3.1")).unwrap();
        match f {
            FilterExpr::And(clauses) => assert_eq!(clauses.len(), 2),
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn values_are_trimmed() {
        let f = Retriever::build_filter(Some("  X300-Pro "), None).unwrap();
        assert_eq!(f, FilterExpr::eq("model_type", "X300-Pro"));
    }
}
