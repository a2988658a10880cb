//! CLI commands

pub mod datasets;
pub mod inspect;
pub mod purge;
pub mod run;

use anyhow::Result;
use std::sync::Arc;

use crate::output::{Formattable, OutputFormat};
use finetune_eval_application::CheckpointStore;
use finetune_eval_common::AppConfig;
use finetune_eval_datasets::DatasetRegistry;
use finetune_eval_domain::{CompetitionId, StorageError};
use finetune_eval_infrastructure::FsCheckpointStore;

/// Context passed to all commands
pub struct CommandContext {
    pub config: AppConfig,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(config: AppConfig, format: OutputFormat) -> Self {
        Self { config, format }
    }

    /// Resolve the competition from the flag or the configured default
    pub fn competition_id(&self, flag: Option<&str>) -> Result<CompetitionId> {
        Ok(self.config.competition_id(flag)?)
    }

    /// Checkpoint store rooted at the configured directory
    pub fn store(&self) -> Result<Arc<dyn CheckpointStore>, StorageError> {
        let store = FsCheckpointStore::new(&self.config.pipeline.checkpoint_dir)?;
        Ok(Arc::new(store))
    }

    /// Dataset registry for the configured sources
    pub fn registry(&self) -> DatasetRegistry {
        DatasetRegistry::new(self.config.datasets.clone())
    }

    /// Print a report in the selected format
    pub fn print(&self, report: &impl Formattable) -> Result<()> {
        println!("{}", report.format(self.format)?);
        Ok(())
    }
}
