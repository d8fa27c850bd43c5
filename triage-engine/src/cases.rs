use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use triage_vector::index::CaseIndex;
use triage_vector::types::CaseVector;

use crate::error::EngineError;
use crate::inference::Embedder;

/// A historical problem/root-cause/solution record.
///
/// `id` is stable and unique across the store and doubles as the index
/// entry id, so re-loading a record overwrites instead of duplicating.
/// `metadata` carries exact-match attributes — at minimum `model_type`
/// and `sw_version`, extensible with `country`, `components`, etc.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: String,
    pub problem_description: String,
    pub root_cause: String,
    pub solution: String,
    pub metadata: HashMap<String, String>,
}

impl CaseRecord {
    /// The embedding/search surface: the three free-text fields joined.
    pub fn surface_text(&self) -> String {
        format!(
            "{} {} {}",
            self.problem_description, self.root_cause, self.solution
        )
    }

    fn validate(&self) -> Result<(), EngineError> {
        let required = [
            ("id", &self.id),
            ("problem_description", &self.problem_description),
            ("root_cause", &self.root_cause),
            ("solution", &self.solution),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(EngineError::Validation(format!(
                    "case record '{}' is missing required field '{}'",
                    self.id, field
                )));
            }
        }
        Ok(())
    }
}

/// Read a JSON array of case records from disk.
pub fn read_case_file(path: &Path) -> Result<Vec<CaseRecord>, EngineError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        EngineError::Validation(format!("cannot read case file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        EngineError::Validation(format!("malformed case file {}: {}", path.display(), e))
    })
}

/// Validate, embed, and bulk-upsert records into the index, then persist
/// a snapshot. Same-id re-loads overwrite. Runs once at startup, before
/// any concurrent reads begin.
///
/// Returns the number of records loaded. On validation failure nothing
/// is embedded or written; on embedding failure nothing is written.
pub fn load_cases(
    index: &mut CaseIndex,
    embedder: &dyn Embedder,
    records: &[CaseRecord],
) -> Result<usize, EngineError> {
    let mut seen = HashSet::new();
    for record in records {
        record.validate()?;
        if !seen.insert(record.id.as_str()) {
            return Err(EngineError::Validation(format!(
                "duplicate case id '{}' in load batch",
                record.id
            )));
        }
    }

    if records.is_empty() {
        return Ok(0);
    }

    let texts: Vec<String> = records.iter().map(|r| r.surface_text()).collect();
    let embeddings = embedder.embed(&texts)?;
    if embeddings.len() != records.len() {
        return Err(EngineError::EmbeddingUnavailable(format!(
            "embedder returned {} vectors for {} records",
            embeddings.len(),
            records.len()
        )));
    }

    let vectors: Vec<CaseVector> = records
        .iter()
        .zip(embeddings)
        .map(|(record, embedding)| CaseVector {
            id: record.id.clone(),
            text: record.surface_text(),
            embedding,
            metadata: record.metadata.clone(),
        })
        .collect();

    index.upsert_batch(vectors)?;
    index.persist()?;
    tracing::info!(count = records.len(), "Loaded cases into vector index");
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> CaseRecord {
        let mut metadata = HashMap::new();
        metadata.insert("model_type".to_string(), "X300-Pro".to_string());
        metadata.insert("sw_version".to_string(), "V2.3.1".to_string());
        CaseRecord {
            id: id.to_string(),
            problem_description: "device stuck in boot loop".to_string(),
            root_cause: "corrupted bootloader partition".to_string(),
            solution: "reflash bootloader via recovery".to_string(),
            metadata,
        }
    }

    #[test]
    fn surface_text_joins_the_three_fields() {
        let r = record("A1");
        assert_eq!(
            r.surface_text(),
            "device stuck in boot loop corrupted bootloader partition reflash bootloader via recovery"
        );
    }

    #[test]
    fn blank_required_field_is_a_validation_error() {
        let mut r = record("A1");
        r.solution = "   ".to_string();
        let err = r.validate().unwrap_err();
        assert_eq!(err.code(), "VALIDATION");
        assert!(err.to_string().contains("solution"));
    }

    #[test]
    fn case_file_missing_metadata_fails_to_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.json");
        std::fs::write(
            &path,
            r#"[{"id":"A1","problem_description":"p","root_cause":"r","solution":"s"}]"#,
        )
        .unwrap();
        let err = read_case_file(&path).unwrap_err();
        assert_eq!(err.code(), "VALIDATION");
    }

    #[test]
    fn case_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.json");
        std::fs::write(&path, serde_json::to_string(&[record("A1"), record("A2")]).unwrap())
            .unwrap();
        let records = read_case_file(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "A1");
    }
}
