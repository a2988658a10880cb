//! File-backed candidate discovery
//!
//! Reads the current submission population from a JSON manifest:
//!
//! ```json
//! [
//!   {"name": "org/coder", "version": "r3", "competition_id": "finetune-1", "metadata": {"hotkey": "5F..."}}
//! ]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use finetune_eval_application::CandidateDiscovery;
use finetune_eval_common::RegistryConfig;
use finetune_eval_domain::{Candidate, CandidateIdentity, ConfigurationError, EvalError};

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    name: String,
    version: String,
    competition_id: String,
    #[serde(default)]
    metadata: BTreeMap<String, serde_json::Value>,
}

impl From<ManifestEntry> for Candidate {
    fn from(entry: ManifestEntry) -> Self {
        Candidate {
            identity: CandidateIdentity::new(entry.name, entry.version),
            competition_id: entry.competition_id,
            metadata: entry.metadata,
        }
    }
}

/// Discovers candidates by re-reading a manifest file on every call.
pub struct FileCandidateRegistry {
    path: PathBuf,
}

impl FileCandidateRegistry {
    /// Registry over the given manifest.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Registry over `registry.candidates_path`.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, ConfigurationError> {
        config
            .candidates_path
            .as_ref()
            .map(Self::new)
            .ok_or_else(|| ConfigurationError::Missing("registry.candidates_path".to_string()))
    }

    /// Manifest location
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CandidateDiscovery for FileCandidateRegistry {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn discover(&self) -> Result<Vec<Candidate>, EvalError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            EvalError::Discovery(format!("cannot read {}: {}", self.path.display(), e))
        })?;

        let entries: Vec<ManifestEntry> = serde_json::from_str(&raw).map_err(|e| {
            EvalError::Discovery(format!("invalid manifest {}: {}", self.path.display(), e))
        })?;

        debug!(count = entries.len(), "Read candidate manifest");
        Ok(entries.into_iter().map(Candidate::from).collect())
    }
}
