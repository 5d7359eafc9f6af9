//! Crash-safe snapshot persistence.
//!
//! Checkpoints and the final output are whole-file JSON snapshots of the
//! accepted records so far; each one is independently loadable and a
//! superset of every earlier one. Writes go to a `.tmp` sibling first and
//! are renamed into place, so the newest complete snapshot survives a crash
//! mid-write and a restarted run can seed from it.

use crate::pipeline::PipelineError;
use necrograph_model::ResolvedPerson;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes progress and final snapshots next to the configured output path.
///
/// For an output of `dir/people.json`, checkpoints land at
/// `dir/people_progress_<batch>.json` and the final snapshot at
/// `dir/people.json` (or `dir/people_<limit>.json` for limited runs).
#[derive(Debug, Clone)]
pub struct CheckpointWriter {
    dir: PathBuf,
    stem: String,
    limit: Option<usize>,
}

impl CheckpointWriter {
    pub fn new(output: &Path, limit: Option<usize>) -> Self {
        let dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("snapshot")
            .to_string();
        Self { dir, stem, limit }
    }

    pub fn progress_path(&self, batch: usize) -> PathBuf {
        self.dir.join(format!("{}_progress_{batch}.json", self.stem))
    }

    pub fn final_path(&self) -> PathBuf {
        match self.limit {
            Some(limit) => self.dir.join(format!("{}_{limit}.json", self.stem)),
            None => self.dir.join(format!("{}.json", self.stem)),
        }
    }

    pub fn write_progress(
        &self,
        batch: usize,
        records: &[ResolvedPerson],
    ) -> Result<PathBuf, PipelineError> {
        let path = self.progress_path(batch);
        self.write_snapshot(&path, records)?;
        Ok(path)
    }

    pub fn write_final(&self, records: &[ResolvedPerson]) -> Result<PathBuf, PipelineError> {
        let path = self.final_path();
        self.write_snapshot(&path, records)?;
        Ok(path)
    }

    fn write_snapshot(&self, path: &Path, records: &[ResolvedPerson]) -> Result<(), PipelineError> {
        let json = serde_json::to_string_pretty(records)?;
        fs::create_dir_all(&self.dir).map_err(|e| PipelineError::Checkpoint {
            path: self.dir.clone(),
            source: e,
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| PipelineError::Checkpoint {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, path).map_err(|e| PipelineError::Checkpoint {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::info!(path = %path.display(), records = records.len(), "snapshot written");
        Ok(())
    }
}

/// Load a snapshot written by [`CheckpointWriter`], e.g. to resume a run.
pub fn load_snapshot(path: &Path) -> Result<Vec<ResolvedPerson>, PipelineError> {
    let text = fs::read_to_string(path).map_err(|e| PipelineError::Checkpoint {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(serde_json::from_str(&text)?)
}
