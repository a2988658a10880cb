//! Seams between the pipeline and the outside world.
//!
//! The evaluation loop only talks to storage, candidate discovery and the
//! scorer through these traits. Concrete adapters live in the
//! infrastructure crate; test doubles live in the testing crate.

use async_trait::async_trait;
use finetune_eval_domain::{
    Candidate, CompetitionId, EvalError, RunId, ScoringError, StorageError, TaskSet,
    TrackingRecord,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two checkpoint families kept per competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointKind {
    /// The fixed benchmark task set
    Tasks,
    /// Accumulated tracking records
    Results,
}

impl CheckpointKind {
    /// Both kinds
    pub const ALL: [CheckpointKind; 2] = [CheckpointKind::Tasks, CheckpointKind::Results];

    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointKind::Tasks => "tasks",
            CheckpointKind::Results => "results",
        }
    }
}

impl fmt::Display for CheckpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Competition-scoped checkpoint persistence.
///
/// Synchronous so that it can be driven from `Drop` and from exit hooks.
/// Assumes a single writer per competition.
pub trait CheckpointStore: Send + Sync {
    /// Load the task set, `None` if it was never saved.
    fn load_tasks(&self, competition_id: &CompetitionId) -> Result<Option<TaskSet>, StorageError>;

    /// Save the task set, replacing any previous one.
    fn save_tasks(&self, competition_id: &CompetitionId, tasks: &TaskSet)
        -> Result<(), StorageError>;

    /// Load tracking records, empty if none were saved.
    fn load_results(
        &self,
        competition_id: &CompetitionId,
    ) -> Result<Vec<TrackingRecord>, StorageError>;

    /// Save the full accumulated record set.
    fn save_results(
        &self,
        competition_id: &CompetitionId,
        records: &[TrackingRecord],
    ) -> Result<(), StorageError>;

    /// Delete one competition's artifacts. Returns how many were removed;
    /// removing nothing is not an error.
    fn purge(&self, competition_id: &CompetitionId) -> Result<usize, StorageError>;

    /// Delete every artifact the store recognizes, across all competitions.
    fn purge_all(&self) -> Result<usize, StorageError>;

    /// Competitions with at least one artifact.
    fn list_competitions(&self) -> Result<Vec<CompetitionId>, StorageError>;
}

/// Per-run information handed to the scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringContext {
    pub competition_id: CompetitionId,
    pub run_id: RunId,
    pub similarity_model: String,
}

impl ScoringContext {
    /// Context for a fresh run.
    pub fn new(competition_id: CompetitionId, similarity_model: impl Into<String>) -> Self {
        Self {
            competition_id,
            run_id: RunId::new(),
            similarity_model: similarity_model.into(),
        }
    }
}

/// Scores one candidate against the task set.
///
/// Must be deterministic for a given candidate and task set; the loop never
/// scores a candidate twice.
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Score a candidate.
    async fn score(
        &self,
        ctx: &ScoringContext,
        candidate: &Candidate,
        tasks: &TaskSet,
    ) -> Result<f64, ScoringError>;
}

/// Reports the current population of submitted candidates.
#[async_trait]
pub trait CandidateDiscovery: Send + Sync {
    /// Return every currently visible candidate, in no particular order.
    async fn discover(&self) -> Result<Vec<Candidate>, EvalError>;
}
