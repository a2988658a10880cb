//! Lazily built registry of named dataset sources.

use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::adapters::{BigCodeBenchSource, DatasetSource, SyntheticSource};
use finetune_eval_common::DatasetsConfig;
use finetune_eval_domain::ConfigurationError;

enum Slot {
    Ready(Arc<dyn DatasetSource>),
    Unconfigured { key: &'static str },
}

/// Summary of one registered source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetInfo {
    /// Registry key
    pub name: &'static str,
    /// Human-readable description, empty when the source is unconfigured
    pub description: &'static str,
    /// Whether `get` would succeed for this name
    pub configured: bool,
}

/// Maps dataset names to shared source instances.
///
/// Every source is constructed on the first lookup; later lookups hand out
/// the same instances.
pub struct DatasetRegistry {
    config: DatasetsConfig,
    sources: OnceCell<IndexMap<&'static str, Slot>>,
}

impl DatasetRegistry {
    /// Create a registry; nothing is constructed yet.
    pub fn new(config: DatasetsConfig) -> Self {
        Self {
            config,
            sources: OnceCell::new(),
        }
    }

    fn sources(&self) -> &IndexMap<&'static str, Slot> {
        self.sources.get_or_init(|| {
            let mut sources = IndexMap::new();

            let bigcodebench = match &self.config.bigcodebench_path {
                Some(path) => Slot::Ready(Arc::new(BigCodeBenchSource::new(
                    path.clone(),
                    self.config.seed,
                ))),
                None => Slot::Unconfigured {
                    key: BigCodeBenchSource::PATH_KEY,
                },
            };
            sources.insert(BigCodeBenchSource::NAME, bigcodebench);
            sources.insert(
                SyntheticSource::NAME,
                Slot::Ready(Arc::new(SyntheticSource::new(self.config.seed))),
            );

            debug!(count = sources.len(), "Dataset registry initialized");
            sources
        })
    }

    /// Look up a source by name.
    ///
    /// # Errors
    ///
    /// `UnknownDataset` for names that are not registered,
    /// `MissingDatasetConfig` for sources whose settings are absent.
    pub fn get(&self, name: &str) -> Result<Arc<dyn DatasetSource>, ConfigurationError> {
        match self.sources().get(name) {
            Some(Slot::Ready(source)) => Ok(Arc::clone(source)),
            Some(Slot::Unconfigured { key }) => Err(ConfigurationError::MissingDatasetConfig {
                dataset: name.to_string(),
                key: key.to_string(),
            }),
            None => Err(ConfigurationError::UnknownDataset(name.to_string())),
        }
    }

    /// Every registered name, in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.sources().keys().copied().collect()
    }

    /// Describe every registered source
    pub fn describe(&self) -> Vec<DatasetInfo> {
        self.sources()
            .iter()
            .map(|(name, slot)| match slot {
                Slot::Ready(source) => DatasetInfo {
                    name: *name,
                    description: source.description(),
                    configured: true,
                },
                Slot::Unconfigured { .. } => DatasetInfo {
                    name: *name,
                    description: "",
                    configured: false,
                },
            })
            .collect()
    }
}
