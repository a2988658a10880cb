//! Run a competition end to end
//!
//! Builds or reloads the task set, evaluates every newly discovered
//! candidate, and purges the competition's checkpoints on success.

use anyhow::Result;
use std::sync::Arc;
use tracing::instrument;

use crate::commands::CommandContext;
use crate::interactive::spinner;
use crate::output::RunReport;
use finetune_eval_application::{CheckpointStore, EvaluationSession, LifecycleManager};
use finetune_eval_common::AppConfig;
use finetune_eval_datasets::DatasetRegistry;
use finetune_eval_domain::{CompetitionId, EvalResult, ResultSet};
use finetune_eval_infrastructure::{CommandScorer, FileCandidateRegistry, FsCheckpointStore};

/// Knobs for [`run_competition_with`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Leave the checkpoints on disk after a successful run
    pub keep_checkpoints: bool,
}

/// Evaluate a competition with the configured collaborators.
///
/// Progress is checkpointed after every candidate. On success the
/// competition's checkpoints are purged; on failure they are kept so the
/// next invocation resumes where this one stopped.
pub async fn run_competition(
    competition_id: CompetitionId,
    config: &AppConfig,
) -> EvalResult<ResultSet> {
    run_competition_with(competition_id, config, RunOptions::default()).await
}

/// [`run_competition`] with explicit options.
#[instrument(skip(config), fields(competition_id = %competition_id))]
pub async fn run_competition_with(
    competition_id: CompetitionId,
    config: &AppConfig,
    options: RunOptions,
) -> EvalResult<ResultSet> {
    config.validate()?;

    // Collaborators first: a broken setup fails before any sampling
    let discovery = FileCandidateRegistry::from_config(&config.registry)?;
    let scorer = CommandScorer::from_config(&config.scoring)?;

    let store: Arc<dyn CheckpointStore> =
        Arc::new(FsCheckpointStore::new(&config.pipeline.checkpoint_dir)?);
    let lifecycle = LifecycleManager::new(store);
    let registry = DatasetRegistry::new(config.datasets.clone());

    if !options.keep_checkpoints {
        return EvaluationSession::start(
            config,
            competition_id,
            &registry,
            &lifecycle,
            &discovery,
            &scorer,
        )
        .await;
    }

    let mut session = EvaluationSession::open(config, competition_id, &registry, &lifecycle).await?;
    session.keep_checkpoints();
    session.evaluate(&discovery, &scorer).await
}

/// `run` subcommand
pub async fn run(
    ctx: &CommandContext,
    competition_id: Option<String>,
    keep_checkpoints: bool,
) -> Result<()> {
    let competition_id = ctx.competition_id(competition_id.as_deref())?;

    let sp = spinner(&format!("Evaluating competition {competition_id}..."));
    let outcome = run_competition_with(
        competition_id,
        &ctx.config,
        RunOptions { keep_checkpoints },
    )
    .await;
    sp.finish_and_clear();

    let results = outcome?;
    ctx.print(&RunReport::from(&results))
}
