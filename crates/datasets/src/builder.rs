//! Task set construction.

use tracing::{info, instrument};

use crate::adapters::DatasetSource;
use finetune_eval_domain::{DataSourceError, TaskSet};

/// Draws fixed-size task sets from a dataset source.
///
/// The builder makes one `produce_sample` call per task and stops at the
/// first failure. It does not look at checkpoints; callers load an existing
/// task set before asking for a new one.
pub struct TaskSetBuilder;

impl TaskSetBuilder {
    /// Build a task set of `n` tasks.
    #[instrument(skip(source), fields(dataset = source.name()))]
    pub async fn build(source: &dyn DatasetSource, n: usize) -> Result<TaskSet, DataSourceError> {
        let mut samples = Vec::with_capacity(n);
        for _ in 0..n {
            samples.push(source.produce_sample().await?);
        }

        info!(tasks = samples.len(), "Built task set");
        Ok(TaskSet::from_samples(source.name(), samples))
    }
}
