//! Evaluation session: one competition's task set, records and cleanup.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::evaluation::EvaluationLoop;
use crate::lifecycle::{CleanupGuard, LifecycleManager};
use crate::ports::{CandidateDiscovery, CheckpointStore, Scorer, ScoringContext};
use finetune_eval_common::AppConfig;
use finetune_eval_datasets::{DatasetRegistry, DatasetSource, TaskSetBuilder};
use finetune_eval_domain::{
    CompetitionId, EvalResult, ResultSet, RunId, StorageError, TaskSet, TrackingRecord,
};

/// Load a competition's task set, building and saving it on first use.
///
/// Once checkpointed, the task set is always reloaded rather than rebuilt,
/// which keeps its length and content stable across restarts.
#[instrument(skip(store, registry), fields(competition_id = %competition_id))]
pub async fn load_or_build_tasks(
    store: &dyn CheckpointStore,
    registry: &DatasetRegistry,
    competition_id: &CompetitionId,
    source_name: &str,
    sample_size: usize,
) -> EvalResult<TaskSet> {
    if let Some(tasks) = store.load_tasks(competition_id)? {
        if tasks.len() != sample_size {
            warn!(
                checkpointed = tasks.len(),
                configured = sample_size,
                "Keeping checkpointed task set despite different configured size"
            );
        }
        info!(tasks = tasks.len(), dataset = tasks.dataset(), "Loaded task set from checkpoint");
        return Ok(tasks);
    }

    let source = registry.get(source_name)?;
    build_and_save_tasks(store, source.as_ref(), competition_id, sample_size).await
}

/// Draw a fresh task set from `source` and checkpoint it.
///
/// Nothing is saved unless all `sample_size` samples were produced.
#[instrument(
    skip(store, source),
    fields(competition_id = %competition_id, dataset = source.name())
)]
pub async fn build_and_save_tasks(
    store: &dyn CheckpointStore,
    source: &dyn DatasetSource,
    competition_id: &CompetitionId,
    sample_size: usize,
) -> EvalResult<TaskSet> {
    let tasks = TaskSetBuilder::build(source, sample_size).await?;
    store.save_tasks(competition_id, &tasks)?;
    Ok(tasks)
}

/// Owns one competition's evaluation state.
///
/// Opening a session arms a cleanup guard. The guard purges the
/// competition's checkpoints when [`EvaluationSession::cleanup`] is called,
/// when the session is dropped, or from the process exit hooks, whichever
/// comes first. A failed evaluation disarms it so that a restart can resume
/// from the checkpoints.
pub struct EvaluationSession {
    competition_id: CompetitionId,
    run_id: RunId,
    similarity_model: String,
    tasks: TaskSet,
    records: Vec<TrackingRecord>,
    store: Arc<dyn CheckpointStore>,
    guard: CleanupGuard,
}

impl EvaluationSession {
    /// Open a session: load or build the task set, load prior records and
    /// arm cleanup.
    #[instrument(skip(config, registry, lifecycle), fields(competition_id = %competition_id))]
    pub async fn open(
        config: &AppConfig,
        competition_id: CompetitionId,
        registry: &DatasetRegistry,
        lifecycle: &LifecycleManager,
    ) -> EvalResult<Self> {
        let store = lifecycle.store();

        let tasks = load_or_build_tasks(
            store.as_ref(),
            registry,
            &competition_id,
            &config.pipeline.source_name,
            config.pipeline.sample_size,
        )
        .await?;

        let records = store.load_results(&competition_id)?;
        info!(prior = records.len(), "Loaded prior results");

        let guard = lifecycle.guard(&competition_id);

        Ok(Self {
            competition_id,
            run_id: RunId::new(),
            similarity_model: config.scoring.similarity_model.clone(),
            tasks,
            records,
            store,
            guard,
        })
    }

    /// Open, evaluate once, clean up, and return the results.
    pub async fn start(
        config: &AppConfig,
        competition_id: CompetitionId,
        registry: &DatasetRegistry,
        lifecycle: &LifecycleManager,
        discovery: &dyn CandidateDiscovery,
        scorer: &dyn Scorer,
    ) -> EvalResult<ResultSet> {
        let mut session = Self::open(config, competition_id, registry, lifecycle).await?;
        let results = session.evaluate(discovery, scorer).await?;
        session.cleanup()?;
        Ok(results)
    }

    /// Run an evaluation pass over the currently discovered candidates.
    pub async fn evaluate(
        &mut self,
        discovery: &dyn CandidateDiscovery,
        scorer: &dyn Scorer,
    ) -> EvalResult<ResultSet> {
        let context = ScoringContext {
            competition_id: self.competition_id.clone(),
            run_id: self.run_id,
            similarity_model: self.similarity_model.clone(),
        };
        let evaluation = EvaluationLoop::new(Arc::clone(&self.store), context);

        match evaluation
            .run(&self.tasks, discovery, scorer, self.records.clone())
            .await
        {
            Ok(results) => {
                self.records = results.records.clone();
                Ok(results)
            }
            Err(err) => {
                // Checkpoints stay for the restart
                self.guard.disarm();
                match self.store.load_results(&self.competition_id) {
                    Ok(records) => self.records = records,
                    Err(reload) => warn!(
                        competition_id = %self.competition_id,
                        error = %reload,
                        "Reloading results after failed evaluation failed"
                    ),
                }
                Err(err)
            }
        }
    }

    /// Current results
    pub fn results(&self) -> ResultSet {
        ResultSet::new(self.competition_id.clone(), self.records.clone())
    }

    /// Best candidate so far.
    pub fn get_top(&self) -> EvalResult<TrackingRecord> {
        self.results().get_top().cloned()
    }

    /// The competition's task set
    pub fn tasks(&self) -> &TaskSet {
        &self.tasks
    }

    /// Competition this session evaluates
    pub fn competition_id(&self) -> &CompetitionId {
        &self.competition_id
    }

    /// Identifier of this session
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Keep checkpoints after the session ends.
    pub fn keep_checkpoints(&self) {
        self.guard.disarm();
    }

    /// Purge this competition's checkpoints now.
    ///
    /// Works even after the guard was disarmed; calling it again is a no-op.
    pub fn cleanup(&self) -> Result<usize, StorageError> {
        if self.guard.is_armed() {
            return self.guard.cleanup();
        }
        self.store.purge(&self.competition_id)
    }
}
