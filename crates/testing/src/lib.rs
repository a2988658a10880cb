//! Testing utilities for the finetune evaluation pipeline
//!
//! This crate provides:
//! - Test fixtures for domain types
//! - Builder patterns for candidates and tracking records
//! - In-memory mocks of the application ports
//!
//! # Examples
//!
//! ```
//! use finetune_eval_testing::{builders::*, fixtures::*};
//!
//! let competition = test_competition();
//! let candidate = CandidateBuilder::new()
//!     .with_name("org/coder")
//!     .with_competition(competition.as_str())
//!     .build();
//! assert_eq!(candidate.identity.to_string(), "org/coder@1");
//! ```

pub mod builders;
pub mod fixtures;
pub mod mocks;

// Re-export commonly used types
pub use builders::*;
pub use fixtures::*;
pub use mocks::*;

// Re-export testing dependencies for convenience
pub use fake;
pub use proptest;
