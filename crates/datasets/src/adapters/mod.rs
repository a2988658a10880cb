//! Dataset source adapters.
//!
//! This module defines the `DatasetSource` trait every benchmark data source
//! implements, along with the concrete sources shipped with the pipeline.

mod sources;

use async_trait::async_trait;
use finetune_eval_domain::{DataSourceError, SampleRecord};

pub use sources::{BigCodeBenchSource, SyntheticSource};

/// A named source of benchmark samples.
///
/// Sampling strategy and replacement policy belong to the source; callers
/// only ask for one sample at a time.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use finetune_eval_datasets::adapters::DatasetSource;
/// use finetune_eval_domain::{DataSourceError, SampleRecord};
///
/// struct FixedSource;
///
/// #[async_trait]
/// impl DatasetSource for FixedSource {
///     fn name(&self) -> &'static str {
///         "fixed"
///     }
///
///     async fn produce_sample(&self) -> Result<SampleRecord, DataSourceError> {
///         Ok(SampleRecord {
///             source: self.name().to_string(),
///             title: "reverse".to_string(),
///             topic: "strings".to_string(),
///             content: "Reverse a string.".to_string(),
///             extras: Default::default(),
///         })
///     }
/// }
/// ```
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Registry key of this source.
    fn name(&self) -> &'static str;

    /// Human-readable description.
    ///
    /// Default implementation returns the name.
    fn description(&self) -> &'static str {
        self.name()
    }

    /// Whether the source needs settings to be constructed.
    fn requires_configuration(&self) -> bool {
        false
    }

    /// Draw one sample.
    ///
    /// # Errors
    ///
    /// Returns a `DataSourceError` if the underlying data cannot be read or
    /// holds no usable records.
    async fn produce_sample(&self) -> Result<SampleRecord, DataSourceError>;
}
