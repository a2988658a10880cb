//! Infrastructure layer for the finetune evaluation pipeline
//!
//! This crate provides the concrete adapters behind the application ports:
//! - Checkpoint storage on the local filesystem
//! - Candidate discovery from a JSON manifest
//! - Scoring through an external command
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use finetune_eval_application::{CheckpointStore, LifecycleManager};
//! use finetune_eval_infrastructure::FsCheckpointStore;
//!
//! let store: Arc<dyn CheckpointStore> = Arc::new(FsCheckpointStore::new("checkpoints")?);
//! let lifecycle = LifecycleManager::new(store);
//! # Ok::<(), finetune_eval_domain::StorageError>(())
//! ```

pub mod checkpoint;
pub mod registry;
pub mod scorer;

pub use checkpoint::FsCheckpointStore;
pub use registry::FileCandidateRegistry;
pub use scorer::CommandScorer;
