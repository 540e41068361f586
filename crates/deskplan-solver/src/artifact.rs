//! On-disk persistence of solved snapshots.
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/<phase>/<instance>.json       serialized SolvedSnapshot
//! <root>/<phase>/<instance>.finished   completion timestamp
//! ```
//!
//! Files are written to a sibling temporary path and renamed into place, so a
//! reader never observes a partially written artifact. Each (instance, phase)
//! pair has exactly one writer.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use thiserror::Error;
use tracing::info;

use crate::formulation::Phase;
use crate::snapshot::SolvedSnapshot;

/// Format of the completion record.
pub const FINISHED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed snapshot {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed completion record {path}: {content:?}")]
    Timestamp { path: PathBuf, content: String },
}

/// Snapshot and completion-record store rooted at a directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot_path(&self, instance_id: &str, phase: Phase) -> PathBuf {
        self.root
            .join(phase.as_str())
            .join(format!("{instance_id}.json"))
    }

    pub fn finished_path(&self, instance_id: &str, phase: Phase) -> PathBuf {
        self.root
            .join(phase.as_str())
            .join(format!("{instance_id}.finished"))
    }

    /// Writes `snapshot` under its instance id and phase.
    pub fn save(&self, snapshot: &SolvedSnapshot) -> Result<PathBuf, ArtifactError> {
        let path = self.snapshot_path(&snapshot.instance_id, snapshot.phase);
        let json = snapshot
            .to_json_string()
            .map_err(|source| ArtifactError::Json {
                path: path.clone(),
                source,
            })?;
        write_atomically(&path, json.as_bytes())?;
        info!(
            event = "artifact_saved",
            instance = %snapshot.instance_id,
            phase = snapshot.phase.as_str(),
            path = %path.display(),
        );
        Ok(path)
    }

    /// Records that `phase` of `instance_id` finished now.
    pub fn mark_finished(&self, instance_id: &str, phase: Phase) -> Result<PathBuf, ArtifactError> {
        self.mark_finished_at(instance_id, phase, Local::now().naive_local())
    }

    pub fn mark_finished_at(
        &self,
        instance_id: &str,
        phase: Phase,
        at: NaiveDateTime,
    ) -> Result<PathBuf, ArtifactError> {
        let path = self.finished_path(instance_id, phase);
        let stamp = at.format(FINISHED_FORMAT).to_string();
        write_atomically(&path, stamp.as_bytes())?;
        Ok(path)
    }

    pub fn load_snapshot(
        &self,
        instance_id: &str,
        phase: Phase,
    ) -> Result<SolvedSnapshot, ArtifactError> {
        let path = self.snapshot_path(instance_id, phase);
        let contents = fs::read_to_string(&path).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;
        SolvedSnapshot::from_json_str(&contents)
            .map_err(|source| ArtifactError::Json { path, source })
    }

    /// Completion time of a phase, or `None` if it never finished.
    pub fn finished_at(
        &self,
        instance_id: &str,
        phase: Phase,
    ) -> Result<Option<NaiveDateTime>, ArtifactError> {
        let path = self.finished_path(instance_id, phase);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ArtifactError::Io { path, source }),
        };
        NaiveDateTime::parse_from_str(contents.trim(), FINISHED_FORMAT)
            .map(Some)
            .map_err(|_| ArtifactError::Timestamp {
                path,
                content: contents,
            })
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), ArtifactError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ArtifactError::Io { path, source }
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(io_err(dir))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes).map_err(io_err(&tmp))?;
    fs::rename(&tmp, path).map_err(io_err(path))
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
