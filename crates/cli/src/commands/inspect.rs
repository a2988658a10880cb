//! Read-only views of a competition's checkpoints

use anyhow::Result;

use crate::commands::CommandContext;
use crate::interactive::spinner;
use crate::output::{ResultsReport, TasksReport, TopReport};
use finetune_eval_application::load_or_build_tasks;
use finetune_eval_domain::ResultSet;

/// `tasks` subcommand: load the task set, building and checkpointing it on
/// first use
pub async fn tasks(ctx: &CommandContext, competition_id: Option<String>) -> Result<()> {
    let competition_id = ctx.competition_id(competition_id.as_deref())?;
    let store = ctx.store()?;
    let registry = ctx.registry();

    let sp = spinner("Loading task set...");
    let outcome = load_or_build_tasks(
        store.as_ref(),
        &registry,
        &competition_id,
        &ctx.config.pipeline.source_name,
        ctx.config.pipeline.sample_size,
    )
    .await;
    sp.finish_and_clear();

    let tasks = outcome?;
    ctx.print(&TasksReport::new(competition_id, &tasks))
}

fn checkpointed_results(ctx: &CommandContext, competition_id: Option<String>) -> Result<ResultSet> {
    let competition_id = ctx.competition_id(competition_id.as_deref())?;
    let records = ctx.store()?.load_results(&competition_id)?;
    Ok(ResultSet::new(competition_id, records))
}

/// `results` subcommand
pub fn results(ctx: &CommandContext, competition_id: Option<String>) -> Result<()> {
    let results = checkpointed_results(ctx, competition_id)?;
    ctx.print(&ResultsReport::from(&results))
}

/// `top` subcommand. Fails with an empty-result error when nothing has
/// been scored.
pub fn top(ctx: &CommandContext, competition_id: Option<String>) -> Result<()> {
    let results = checkpointed_results(ctx, competition_id)?;
    let top = results.get_top()?;
    ctx.print(&TopReport::from(top))
}
