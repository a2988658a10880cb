//! Mock implementations of the pipeline's collaborators.
//!
//! Provides in-memory stand-ins for the scorer, candidate discovery,
//! checkpoint storage and dataset sources, with call recording and failure
//! injection.

use async_trait::async_trait;
use finetune_eval_application::{CandidateDiscovery, CheckpointStore, Scorer, ScoringContext};
use finetune_eval_datasets::DatasetSource;
use finetune_eval_domain::{
    Candidate, CandidateIdentity, CompetitionId, DataSourceError, EvalError, SampleRecord,
    ScoringError, StorageError, TaskSet, TrackingRecord,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Scorer that records every call.
///
/// Scores come from a per-candidate table, falling back to a default.
/// Can be told to fail on the n-th call or for a given candidate name.
pub struct CountingScorer {
    default_score: f64,
    scores: HashMap<String, f64>,
    calls: Arc<RwLock<Vec<CandidateIdentity>>>,
    fail_on_call: Option<usize>,
    fail_on_name: Option<String>,
}

impl CountingScorer {
    pub fn new(default_score: f64) -> Self {
        Self {
            default_score,
            scores: HashMap::new(),
            calls: Arc::new(RwLock::new(Vec::new())),
            fail_on_call: None,
            fail_on_name: None,
        }
    }

    /// Return `score` for the candidate with this name
    pub fn with_score(mut self, name: impl Into<String>, score: f64) -> Self {
        self.scores.insert(name.into(), score);
        self
    }

    /// Fail the n-th call (1-based)
    pub fn fail_on_nth(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// Fail whenever the candidate has this name
    pub fn fail_on(mut self, name: impl Into<String>) -> Self {
        self.fail_on_name = Some(name.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().len()
    }

    /// Names of the scored candidates, in call order
    pub fn called_names(&self) -> Vec<String> {
        self.calls.read().iter().map(|c| c.name.clone()).collect()
    }

    pub fn calls_for(&self, name: &str) -> usize {
        self.calls.read().iter().filter(|c| c.name == name).count()
    }
}

impl Default for CountingScorer {
    fn default() -> Self {
        Self::new(0.5)
    }
}

#[async_trait]
impl Scorer for CountingScorer {
    async fn score(
        &self,
        _ctx: &ScoringContext,
        candidate: &Candidate,
        _tasks: &TaskSet,
    ) -> Result<f64, ScoringError> {
        let call = {
            let mut calls = self.calls.write();
            calls.push(candidate.identity.clone());
            calls.len()
        };

        let injected = self.fail_on_call == Some(call)
            || self.fail_on_name.as_deref() == Some(candidate.identity.name.as_str());
        if injected {
            return Err(ScoringError::Failed {
                candidate: candidate.identity.to_string(),
                message: "injected failure".to_string(),
            });
        }

        Ok(self
            .scores
            .get(&candidate.identity.name)
            .copied()
            .unwrap_or(self.default_score))
    }
}

/// Discovery returning a fixed, replaceable candidate list
pub struct StaticDiscovery {
    candidates: RwLock<Vec<Candidate>>,
    calls: AtomicUsize,
    failing: bool,
}

impl StaticDiscovery {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates: RwLock::new(candidates),
            calls: AtomicUsize::new(0),
            failing: false,
        }
    }

    /// Discovery that always errors
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn set(&self, candidates: Vec<Candidate>) {
        *self.candidates.write() = candidates;
    }

    pub fn push(&self, candidate: Candidate) {
        self.candidates.write().push(candidate);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CandidateDiscovery for StaticDiscovery {
    async fn discover(&self) -> Result<Vec<Candidate>, EvalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(EvalError::Discovery("registry unreachable".to_string()));
        }
        Ok(self.candidates.read().clone())
    }
}

/// In-memory checkpoint store.
///
/// Results saves can be made to fail from the n-th one on, to simulate a
/// disk going away mid-run. Results loads can be switched to fail at any
/// point.
pub struct MemoryCheckpointStore {
    tasks: RwLock<HashMap<CompetitionId, TaskSet>>,
    results: RwLock<HashMap<CompetitionId, Vec<TrackingRecord>>>,
    task_saves: AtomicUsize,
    result_saves: AtomicUsize,
    fail_results_from: Option<usize>,
    fail_results_load: AtomicBool,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            results: RwLock::new(HashMap::new()),
            task_saves: AtomicUsize::new(0),
            result_saves: AtomicUsize::new(0),
            fail_results_from: None,
            fail_results_load: AtomicBool::new(false),
        }
    }

    /// Make every following `load_results` call fail, or succeed again
    pub fn set_failing_results_load(&self, failing: bool) {
        self.fail_results_load.store(failing, Ordering::SeqCst);
    }

    /// Fail the n-th results save (1-based) and every later one
    pub fn failing_results_save_from(mut self, n: usize) -> Self {
        self.fail_results_from = Some(n);
        self
    }

    pub fn task_save_count(&self) -> usize {
        self.task_saves.load(Ordering::SeqCst)
    }

    pub fn result_save_count(&self) -> usize {
        self.result_saves.load(Ordering::SeqCst)
    }

    /// Records currently persisted for a competition
    pub fn persisted(&self, competition_id: &CompetitionId) -> Vec<TrackingRecord> {
        self.results
            .read()
            .get(competition_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_tasks(&self, competition_id: &CompetitionId) -> bool {
        self.tasks.read().contains_key(competition_id)
    }
}

impl Default for MemoryCheckpointStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load_tasks(&self, competition_id: &CompetitionId) -> Result<Option<TaskSet>, StorageError> {
        Ok(self.tasks.read().get(competition_id).cloned())
    }

    fn save_tasks(
        &self,
        competition_id: &CompetitionId,
        tasks: &TaskSet,
    ) -> Result<(), StorageError> {
        self.task_saves.fetch_add(1, Ordering::SeqCst);
        self.tasks
            .write()
            .insert(competition_id.clone(), tasks.clone());
        Ok(())
    }

    fn load_results(
        &self,
        competition_id: &CompetitionId,
    ) -> Result<Vec<TrackingRecord>, StorageError> {
        if self.fail_results_load.load(Ordering::SeqCst) {
            return Err(StorageError::Io {
                path: format!("memory://results/{competition_id}"),
                message: "injected read failure".to_string(),
            });
        }
        Ok(self.persisted(competition_id))
    }

    fn save_results(
        &self,
        competition_id: &CompetitionId,
        records: &[TrackingRecord],
    ) -> Result<(), StorageError> {
        let save = self.result_saves.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_results_from.is_some_and(|n| save >= n) {
            return Err(StorageError::Io {
                path: format!("memory://results/{competition_id}"),
                message: "injected write failure".to_string(),
            });
        }

        self.results
            .write()
            .insert(competition_id.clone(), records.to_vec());
        Ok(())
    }

    fn purge(&self, competition_id: &CompetitionId) -> Result<usize, StorageError> {
        let tasks = self.tasks.write().remove(competition_id).is_some();
        let results = self.results.write().remove(competition_id).is_some();
        Ok(usize::from(tasks) + usize::from(results))
    }

    fn purge_all(&self) -> Result<usize, StorageError> {
        let mut tasks = self.tasks.write();
        let mut results = self.results.write();
        let removed = tasks.len() + results.len();
        tasks.clear();
        results.clear();
        Ok(removed)
    }

    fn list_competitions(&self) -> Result<Vec<CompetitionId>, StorageError> {
        let mut ids: Vec<CompetitionId> = self
            .tasks
            .read()
            .keys()
            .chain(self.results.read().keys())
            .cloned()
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

/// Dataset source yielding numbered samples in order
pub struct SequenceDatasetSource {
    produced: AtomicUsize,
    fail_after: Option<usize>,
}

impl SequenceDatasetSource {
    pub fn new() -> Self {
        Self {
            produced: AtomicUsize::new(0),
            fail_after: None,
        }
    }

    /// Produce `n` samples, then fail
    pub fn failing_after(n: usize) -> Self {
        Self {
            produced: AtomicUsize::new(0),
            fail_after: Some(n),
        }
    }

    pub fn produced(&self) -> usize {
        self.produced.load(Ordering::SeqCst)
    }
}

impl Default for SequenceDatasetSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatasetSource for SequenceDatasetSource {
    fn name(&self) -> &'static str {
        "sequence"
    }

    async fn produce_sample(&self) -> Result<SampleRecord, DataSourceError> {
        let index = self.produced.load(Ordering::SeqCst);
        if self.fail_after.is_some_and(|n| index >= n) {
            return Err(DataSourceError::Unavailable {
                dataset: self.name().to_string(),
                message: "injected failure".to_string(),
            });
        }
        self.produced.fetch_add(1, Ordering::SeqCst);

        Ok(SampleRecord {
            source: self.name().to_string(),
            title: format!("sequence/{index}"),
            topic: "sequence".to_string(),
            content: format!("Task number {index}"),
            extras: HashMap::new(),
        })
    }
}
