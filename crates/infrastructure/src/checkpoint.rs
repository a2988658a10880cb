//! Checkpoint module - filesystem-backed checkpoint storage
//!
//! Each competition owns two files in the checkpoint directory,
//! `tasks_{competition_id}.json` and `results_{competition_id}.json`. Every
//! file wraps its payload in a small envelope recording the format version,
//! the competition and the save time, so that a file renamed or copied
//! across competitions is detected instead of silently trusted.

use std::collections::BTreeSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use finetune_eval_application::{CheckpointKind, CheckpointStore};
use finetune_eval_domain::{CompetitionId, StorageError, TaskSet, TrackingRecord};

/// Envelope format version written by this store.
pub const FORMAT_VERSION: u32 = 1;

const EXTENSION: &str = ".json";

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    kind: CheckpointKind,
    competition_id: CompetitionId,
    saved_at: DateTime<Utc>,
    payload: T,
}

/// Checkpoint store rooted at a local directory.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a crash mid-write leaves the previous checkpoint
/// intact.
pub struct FsCheckpointStore {
    root: PathBuf,
}

impl FsCheckpointStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| io_error(&root, e))?;
        Ok(Self { root })
    }

    /// Checkpoint directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of one artifact
    pub fn artifact_path(&self, kind: CheckpointKind, competition_id: &CompetitionId) -> PathBuf {
        self.root.join(format!("{kind}_{competition_id}{EXTENSION}"))
    }

    fn write<T: Serialize>(
        &self,
        kind: CheckpointKind,
        competition_id: &CompetitionId,
        payload: &T,
    ) -> Result<(), StorageError> {
        let path = self.artifact_path(kind, competition_id);
        let envelope = Envelope {
            version: FORMAT_VERSION,
            kind,
            competition_id: competition_id.clone(),
            saved_at: Utc::now(),
            payload,
        };
        let bytes = serde_json::to_vec(&envelope)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let mut tmp = NamedTempFile::new_in(&self.root).map_err(|e| io_error(&self.root, e))?;
        tmp.write_all(&bytes).map_err(|e| io_error(tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| io_error(tmp.path(), e))?;
        tmp.persist(&path).map_err(|e| io_error(&path, e.error))?;

        debug!(path = %path.display(), bytes = bytes.len(), "Checkpoint written");
        Ok(())
    }

    fn read<T: DeserializeOwned>(
        &self,
        kind: CheckpointKind,
        competition_id: &CompetitionId,
    ) -> Result<Option<T>, StorageError> {
        let path = self.artifact_path(kind, competition_id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e)),
        };

        let corrupt = |reason: String| StorageError::Corrupt {
            path: path.display().to_string(),
            reason,
        };

        let envelope: Envelope<T> =
            serde_json::from_slice(&bytes).map_err(|e| corrupt(e.to_string()))?;

        if envelope.version != FORMAT_VERSION {
            return Err(corrupt(format!(
                "unsupported format version {}",
                envelope.version
            )));
        }
        if envelope.kind != kind {
            return Err(corrupt(format!("holds {} instead of {}", envelope.kind, kind)));
        }
        if &envelope.competition_id != competition_id {
            return Err(corrupt(format!(
                "belongs to competition {}",
                envelope.competition_id
            )));
        }

        debug!(path = %path.display(), saved_at = %envelope.saved_at, "Checkpoint read");
        Ok(Some(envelope.payload))
    }

    fn remove(&self, path: &Path) -> Result<bool, StorageError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(path, e)),
        }
    }

    /// Every artifact in the directory, as (path, kind, competition)
    fn artifacts(&self) -> Result<Vec<(PathBuf, CheckpointKind, CompetitionId)>, StorageError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.root, e)),
        };

        let mut artifacts = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(&self.root, e))?;
            let name = entry.file_name();
            if let Some((kind, id)) = name.to_str().and_then(parse_artifact_name) {
                artifacts.push((entry.path(), kind, id));
            }
        }
        Ok(artifacts)
    }
}

/// Split `{kind}_{competition_id}.json` back into its parts.
fn parse_artifact_name(name: &str) -> Option<(CheckpointKind, CompetitionId)> {
    let stem = name.strip_suffix(EXTENSION)?;
    CheckpointKind::ALL.into_iter().find_map(|kind| {
        let rest = stem.strip_prefix(kind.as_str())?.strip_prefix('_')?;
        CompetitionId::parse(rest).ok().map(|id| (kind, id))
    })
}

fn io_error(path: &Path, err: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

impl CheckpointStore for FsCheckpointStore {
    fn load_tasks(&self, competition_id: &CompetitionId) -> Result<Option<TaskSet>, StorageError> {
        self.read(CheckpointKind::Tasks, competition_id)
    }

    #[instrument(skip(self, tasks), fields(tasks = tasks.len()))]
    fn save_tasks(
        &self,
        competition_id: &CompetitionId,
        tasks: &TaskSet,
    ) -> Result<(), StorageError> {
        self.write(CheckpointKind::Tasks, competition_id, tasks)
    }

    fn load_results(
        &self,
        competition_id: &CompetitionId,
    ) -> Result<Vec<TrackingRecord>, StorageError> {
        Ok(self
            .read(CheckpointKind::Results, competition_id)?
            .unwrap_or_default())
    }

    #[instrument(skip(self, records), fields(records = records.len()))]
    fn save_results(
        &self,
        competition_id: &CompetitionId,
        records: &[TrackingRecord],
    ) -> Result<(), StorageError> {
        self.write(CheckpointKind::Results, competition_id, &records)
    }

    #[instrument(skip(self))]
    fn purge(&self, competition_id: &CompetitionId) -> Result<usize, StorageError> {
        let mut removed = 0;
        for kind in CheckpointKind::ALL {
            if self.remove(&self.artifact_path(kind, competition_id))? {
                removed += 1;
            }
        }
        info!(removed, "Purged competition checkpoints");
        Ok(removed)
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn purge_all(&self) -> Result<usize, StorageError> {
        let mut removed = 0;
        for (path, _, _) in self.artifacts()? {
            if self.remove(&path)? {
                removed += 1;
            }
        }
        info!(removed, "Purged all checkpoints");
        Ok(removed)
    }

    fn list_competitions(&self) -> Result<Vec<CompetitionId>, StorageError> {
        let ids: BTreeSet<CompetitionId> = self
            .artifacts()?
            .into_iter()
            .map(|(_, _, id)| id)
            .collect();
        Ok(ids.into_iter().collect())
    }
}
