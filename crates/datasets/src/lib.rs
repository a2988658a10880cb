//! Benchmark data for the finetune evaluation pipeline.
//!
//! ## Architecture
//!
//! - **adapters**: the `DatasetSource` trait and the concrete sources
//! - **registry**: `DatasetRegistry`, lazily mapping names to shared sources
//! - **builder**: `TaskSetBuilder`, drawing a fixed-size task set from a source
//!
//! ## Usage
//!
//! ```rust,no_run
//! use finetune_eval_common::DatasetsConfig;
//! use finetune_eval_datasets::{DatasetRegistry, TaskSetBuilder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = DatasetRegistry::new(DatasetsConfig::default());
//!     let source = registry.get("synthetic")?;
//!
//!     let tasks = TaskSetBuilder::build(source.as_ref(), 100).await?;
//!     println!("Built {} tasks", tasks.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod builder;
pub mod registry;

pub use adapters::{BigCodeBenchSource, DatasetSource, SyntheticSource};
pub use builder::TaskSetBuilder;
pub use registry::{DatasetInfo, DatasetRegistry};
