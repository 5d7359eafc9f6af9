//! Candidate input loading.
//!
//! The enrichment input is an externally produced JSON array of harvested
//! rows; only the entity reference and the cause-of-death pair are read,
//! every other member is ignored.

use crate::pipeline::PipelineError;
use necrograph_model::EntityId;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// One candidate person awaiting enrichment.
///
/// The cause-of-death pair rides along untouched and is merged into the
/// enriched record at assembly time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRow {
    pub id: EntityId,
    pub cause_of_death: String,
    pub cause_of_death_label: String,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(default)]
    person: String,
    #[serde(rename = "causeOfDeath", default)]
    cause_of_death: String,
    #[serde(rename = "causeOfDeathLabel", default)]
    cause_of_death_label: String,
}

/// Read and normalize a candidate file.
///
/// Rows whose `person` does not normalize to an entity id are dropped with a
/// warning; duplicate ids keep their first occurrence so a person is
/// enriched (and emitted) once.
pub fn load_candidates(path: &Path) -> Result<Vec<CandidateRow>, PipelineError> {
    let text = fs::read_to_string(path).map_err(|e| PipelineError::Candidates {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let rows: Vec<RawRow> = serde_json::from_str(&text).map_err(|e| PipelineError::Candidates {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut seen = HashSet::new();
    let mut candidates = Vec::with_capacity(rows.len());
    for row in rows {
        match EntityId::parse(&row.person) {
            Ok(id) => {
                if seen.insert(id.clone()) {
                    candidates.push(CandidateRow {
                        id,
                        cause_of_death: row.cause_of_death,
                        cause_of_death_label: row.cause_of_death_label,
                    });
                }
            }
            Err(err) => {
                tracing::warn!(person = %row.person, error = %err, "dropping candidate with malformed id");
            }
        }
    }
    Ok(candidates)
}
