//! Benchmark task types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One raw sample produced by a dataset source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Name of the dataset source that produced the sample
    pub source: String,
    /// Short title of the problem
    pub title: String,
    /// Topic or category label
    #[serde(default)]
    pub topic: String,
    /// Problem body
    pub content: String,
    /// Source-specific extra fields (reference solution, tests, ...)
    #[serde(default)]
    pub extras: HashMap<String, serde_json::Value>,
}

/// An immutable evaluation unit built from one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Position of the task inside its task set
    pub index: usize,
    /// The sample the task was built from
    pub sample: SampleRecord,
}

impl Task {
    /// Wrap a sample into a task at the given position.
    pub fn new(index: usize, sample: SampleRecord) -> Self {
        Self { index, sample }
    }
}

/// Fixed-length, ordered collection of tasks for one competition.
///
/// A task set is built once per competition and then reloaded from its
/// checkpoint; its length never changes afterwards. There is no
/// way to push into an existing set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSet {
    dataset: String,
    tasks: Vec<Task>,
    created_at: DateTime<Utc>,
}

impl TaskSet {
    /// Build a task set from samples, numbering tasks in draw order.
    pub fn from_samples(dataset: impl Into<String>, samples: Vec<SampleRecord>) -> Self {
        let tasks = samples
            .into_iter()
            .enumerate()
            .map(|(index, sample)| Task::new(index, sample))
            .collect();

        Self {
            dataset: dataset.into(),
            tasks,
            created_at: Utc::now(),
        }
    }

    /// Dataset source the tasks were drawn from
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Tasks in order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the set has no tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// When the set was first built
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Iterate over the tasks
    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }
}

impl<'a> IntoIterator for &'a TaskSet {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(title: &str) -> SampleRecord {
        SampleRecord {
            source: "synthetic".to_string(),
            title: title.to_string(),
            topic: "strings".to_string(),
            content: format!("Solve {title}"),
            extras: HashMap::new(),
        }
    }

    #[test]
    fn test_task_set_numbers_tasks_in_order() {
        let set = TaskSet::from_samples("synthetic", vec![sample("a"), sample("b"), sample("c")]);

        assert_eq!(set.len(), 3);
        assert_eq!(set.dataset(), "synthetic");
        let indices: Vec<usize> = set.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(set.tasks()[1].sample.title, "b");
    }

    #[test]
    fn test_task_set_serialization_preserves_content() {
        let set = TaskSet::from_samples("synthetic", vec![sample("a")]);
        let json = serde_json::to_string(&set).unwrap();
        let back: TaskSet = serde_json::from_str(&json).unwrap();
        assert_eq!(set, back);
    }
}
