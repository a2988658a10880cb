//! Finetune evaluation CLI library
//!
//! Wires configuration, the filesystem checkpoint store, the candidate
//! registry and the external scorer into the evaluation pipeline, and
//! renders its results for the terminal.

pub mod commands;
pub mod config;
pub mod interactive;
pub mod output;

pub use commands::run::{run_competition, run_competition_with, RunOptions};
pub use commands::CommandContext;
pub use config::Overrides;
pub use output::{Formattable, JsonFormatter, OutputFormat, PlainFormatter, TableFormatter};

/// Re-export common types
pub use anyhow::{Context, Result};

/// Exit status after an interrupt (128 + SIGINT)
pub const EXIT_INTERRUPTED: i32 = 130;

/// Map an error to the process exit status.
///
/// Pipeline errors carry their own status; anything else is 1.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    use finetune_eval_domain::{ConfigurationError, EvalError, StorageError};

    if let Some(err) = err.downcast_ref::<EvalError>() {
        return err.exit_code();
    }
    if err.downcast_ref::<ConfigurationError>().is_some() {
        return 2;
    }
    if err.downcast_ref::<StorageError>().is_some() {
        return 5;
    }
    1
}
