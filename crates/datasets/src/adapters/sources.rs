//! Concrete dataset sources.
//!
//! Both sources sample with replacement from a seeded RNG, so a fixed seed
//! reproduces the same task set.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use super::DatasetSource;
use finetune_eval_domain::{DataSourceError, SampleRecord};

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Samples BigCodeBench problems from a local JSONL export.
///
/// The file is read on the first draw and kept in memory afterwards.
pub struct BigCodeBenchSource {
    path: PathBuf,
    records: OnceCell<Vec<SampleRecord>>,
    rng: Mutex<StdRng>,
}

/// One line of the BigCodeBench export.
#[derive(Debug, Deserialize)]
struct BigCodeBenchRow {
    task_id: String,
    #[serde(default)]
    instruct_prompt: Option<String>,
    #[serde(default)]
    complete_prompt: Option<String>,
    #[serde(default)]
    code_prompt: Option<String>,
    #[serde(default)]
    canonical_solution: Option<String>,
    #[serde(default)]
    test: Option<String>,
    #[serde(default)]
    entry_point: Option<String>,
    #[serde(default)]
    libs: serde_json::Value,
}

impl BigCodeBenchSource {
    /// Registry key
    pub const NAME: &'static str = "bigcodebench";

    /// Setting that must point at the JSONL export
    pub const PATH_KEY: &'static str = "datasets.bigcodebench_path";

    /// Create a source over the given file.
    pub fn new(path: impl Into<PathBuf>, seed: Option<u64>) -> Self {
        Self {
            path: path.into(),
            records: OnceCell::new(),
            rng: Mutex::new(seeded_rng(seed)),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Vec<SampleRecord>, DataSourceError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| DataSourceError::Unavailable {
                dataset: Self::NAME.to_string(),
                message: format!("{}: {}", self.path.display(), e),
            })?;

        let records = parse_rows(&raw)?;
        if records.is_empty() {
            return Err(DataSourceError::Empty {
                dataset: Self::NAME.to_string(),
            });
        }

        debug!(count = records.len(), "Loaded bigcodebench records");
        Ok(records)
    }
}

fn parse_rows(raw: &str) -> Result<Vec<SampleRecord>, DataSourceError> {
    let mut records = Vec::new();

    for (idx, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let row: BigCodeBenchRow =
            serde_json::from_str(line).map_err(|e| DataSourceError::InvalidRecord {
                dataset: BigCodeBenchSource::NAME.to_string(),
                line: idx + 1,
                message: e.to_string(),
            })?;

        records.push(row.into_sample());
    }

    Ok(records)
}

impl BigCodeBenchRow {
    fn into_sample(self) -> SampleRecord {
        let content = self
            .instruct_prompt
            .or_else(|| self.complete_prompt.clone())
            .unwrap_or_default();

        let mut extras = HashMap::new();
        let optional = [
            ("complete_prompt", self.complete_prompt),
            ("code_prompt", self.code_prompt),
            ("canonical_solution", self.canonical_solution),
            ("test", self.test),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                extras.insert(key.to_string(), json!(value));
            }
        }
        if !self.libs.is_null() {
            extras.insert("libs".to_string(), self.libs);
        }

        SampleRecord {
            source: BigCodeBenchSource::NAME.to_string(),
            title: self.task_id,
            topic: self.entry_point.unwrap_or_else(|| "task_func".to_string()),
            content,
            extras,
        }
    }
}

#[async_trait]
impl DatasetSource for BigCodeBenchSource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "BigCodeBench problems sampled from a local JSONL export"
    }

    fn requires_configuration(&self) -> bool {
        true
    }

    async fn produce_sample(&self) -> Result<SampleRecord, DataSourceError> {
        let records = self.records.get_or_try_init(|| self.load()).await?;

        let mut rng = self.rng.lock();
        records
            .choose(&mut *rng)
            .cloned()
            .ok_or_else(|| DataSourceError::Empty {
                dataset: Self::NAME.to_string(),
            })
    }
}

const SYNTHETIC_TOPICS: [(&str, &[&str]); 4] = [
    (
        "strings",
        &[
            "reverses the words of a sentence",
            "counts the vowels in a string",
            "checks whether a string is a palindrome",
        ],
    ),
    (
        "lists",
        &[
            "removes duplicates while preserving order",
            "returns the k largest elements",
            "rotates a list by n positions",
        ],
    ),
    (
        "math",
        &[
            "computes the n-th Fibonacci number",
            "returns the greatest common divisor of two integers",
            "checks whether a number is prime",
        ],
    ),
    (
        "dicts",
        &[
            "inverts a mapping of keys to values",
            "merges two dictionaries summing shared keys",
            "groups words by their first letter",
        ],
    ),
];

/// Generates small coding prompts without any backing data.
///
/// Needs no configuration, which makes it useful for smoke runs.
pub struct SyntheticSource {
    rng: Mutex<StdRng>,
}

impl SyntheticSource {
    /// Registry key
    pub const NAME: &'static str = "synthetic";

    /// Create a generator, seeded when `seed` is given.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: Mutex::new(seeded_rng(seed)),
        }
    }
}

#[async_trait]
impl DatasetSource for SyntheticSource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Generated coding prompts, no data files required"
    }

    async fn produce_sample(&self) -> Result<SampleRecord, DataSourceError> {
        let mut rng = self.rng.lock();

        let (topic, goals) = SYNTHETIC_TOPICS[rng.gen_range(0..SYNTHETIC_TOPICS.len())];
        let goal = goals[rng.gen_range(0..goals.len())];
        let variant: u32 = rng.gen_range(0..10_000);

        let mut extras = HashMap::new();
        extras.insert("difficulty".to_string(), json!(rng.gen_range(1..=5)));

        Ok(SampleRecord {
            source: Self::NAME.to_string(),
            title: format!("{}/{:04}", topic, variant),
            topic: topic.to_string(),
            content: format!("Write a Python function `task_func` that {}.", goal),
            extras,
        })
    }
}
