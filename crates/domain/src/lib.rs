//! Finetune Eval Domain Types
//!
//! Core data model for the incremental evaluation pipeline: the benchmark
//! task set a competition is judged on, the candidates submitted to it, the
//! tracking records that accumulate their scores, and the error hierarchy
//! shared by every other crate.
//!
//! ## Architecture
//!
//! - **identifiers**: competition ids (validated, filesystem-safe) and run ids
//! - **task**: sample records, tasks and fixed-length task sets
//! - **candidate**: candidate identities and discovered candidates
//! - **tracking**: tracking records and the result set view
//! - **errors**: error kinds surfaced by the pipeline
//!
//! ## Usage
//!
//! ```rust
//! use finetune_eval_domain::{
//!     Candidate, CandidateIdentity, CompetitionId, ResultSet, TrackingRecord,
//! };
//!
//! let competition = CompetitionId::parse("finetune-1").unwrap();
//! let candidate = Candidate::new(CandidateIdentity::new("org/model", "v1"), "finetune-1");
//! let record = TrackingRecord::pending(candidate, competition.clone()).scored(0.8);
//!
//! let results = ResultSet::new(competition, vec![record]);
//! assert_eq!(results.get_top().unwrap().score, Some(0.8));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod candidate;
pub mod errors;
pub mod identifiers;
pub mod task;
pub mod tracking;

pub use candidate::{Candidate, CandidateIdentity};
pub use errors::{
    ConfigurationError, DataSourceError, EvalError, EvalResult, ScoringError, StorageError,
};
pub use identifiers::{CompetitionId, RunId};
pub use task::{SampleRecord, Task, TaskSet};
pub use tracking::{ResultSet, TrackingRecord};
