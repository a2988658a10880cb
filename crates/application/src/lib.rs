//! Application layer for the finetune evaluation pipeline
//!
//! Orchestrates the domain types against the outside world.
//!
//! ## Modules
//!
//! - `ports` - Checkpoint storage, scorer and candidate discovery traits
//! - `evaluation` - The incremental evaluation loop
//! - `lifecycle` - Checkpoint cleanup triggers
//! - `session` - Evaluation sessions tying it all together

pub mod evaluation;
pub mod lifecycle;
pub mod ports;
pub mod session;

// Re-export commonly used types
pub use evaluation::{CandidateOutcome, EvaluationLoop};
pub use lifecycle::{run_exit_hooks, CleanupGuard, CleanupTrigger, LifecycleManager};
pub use ports::{CandidateDiscovery, CheckpointKind, CheckpointStore, Scorer, ScoringContext};
pub use session::{build_and_save_tasks, load_or_build_tasks, EvaluationSession};
