//! Checkpoint purging

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::commands::CommandContext;
use crate::interactive::confirm;
use crate::output::{colors, PurgeReport};
use finetune_eval_application::LifecycleManager;

/// Which checkpoints to remove
#[derive(Debug, Clone)]
pub enum PurgeScope {
    /// One competition's artifacts
    Competition(Option<String>),
    /// Every checkpoint artifact in the directory
    All { assume_yes: bool },
}

/// `purge` subcommand
pub fn purge(ctx: &CommandContext, scope: PurgeScope) -> Result<()> {
    let store = ctx.store()?;

    let report = match scope {
        PurgeScope::Competition(flag) => {
            let competition_id = ctx.competition_id(flag.as_deref())?;
            let removed = LifecycleManager::new(Arc::clone(&store)).cleanup(&competition_id)?;
            PurgeReport {
                scope: competition_id.to_string(),
                removed,
            }
        }
        PurgeScope::All { assume_yes } => {
            let competitions = store.list_competitions()?;
            if competitions.is_empty() {
                println!("{}", colors::dim("No checkpoints to purge"));
                return Ok(());
            }

            let prompt = format!(
                "Remove checkpoints of {} competition(s) in {}?",
                competitions.len(),
                ctx.config.pipeline.checkpoint_dir.display()
            );
            if !assume_yes && !confirm(&prompt)? {
                println!("{}", colors::warning("Aborted"));
                return Ok(());
            }

            let removed = store.purge_all()?;
            info!(removed, "Purged all checkpoints");
            PurgeReport {
                scope: "all".to_string(),
                removed,
            }
        }
    };

    ctx.print(&report)
}
