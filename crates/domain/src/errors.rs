//! Error types for the evaluation pipeline.
//!
//! Every failure the pipeline can surface is one of a small set of kinds.
//! None of them is retried in-process: a run that fails is retried by
//! restarting it, which resumes from the last checkpoint. A candidate whose
//! competition id does not match the active competition is not an error at
//! all; it is scored 0.0 by the evaluation loop.

use crate::identifiers::CompetitionId;

/// Top-level pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Missing or invalid setup; fatal
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A dataset source could not produce a sample; fatal for the build attempt
    #[error("Data source error: {0}")]
    DataSource(#[from] DataSourceError),

    /// The scoring collaborator failed; aborts the current run
    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    /// No scored candidates to pick from
    #[error("No scored candidates for competition {competition_id}")]
    EmptyResult {
        /// Competition whose result set was empty
        competition_id: CompetitionId,
    },

    /// Checkpoint read/write failure; fatal
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The candidate discovery collaborator failed
    #[error("Discovery error: {0}")]
    Discovery(String),
}

impl EvalError {
    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::DataSource(_) => "DATA_SOURCE_ERROR",
            Self::Scoring(_) => "SCORING_ERROR",
            Self::EmptyResult { .. } => "EMPTY_RESULT",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Discovery(_) => "DISCOVERY_ERROR",
        }
    }

    /// Process exit status used by the command-line entry point
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 2,
            Self::DataSource(_) => 3,
            Self::Scoring(_) => 4,
            Self::Storage(_) => 5,
            Self::Discovery(_) => 6,
            Self::EmptyResult { .. } => 7,
        }
    }

    /// Whether the pipeline retries this error in-process.
    ///
    /// Always false. Progress survives on disk, so a retry is a restart.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// A required setting is absent
    #[error("Missing required setting: {0}")]
    Missing(String),

    /// A setting has an unusable value
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Competition id failed validation
    #[error("Invalid competition id {value:?}: {reason}")]
    InvalidCompetitionId { value: String, reason: String },

    /// No dataset source is registered under this name
    #[error("Unknown dataset source: {0}")]
    UnknownDataset(String),

    /// Dataset source exists but its configuration is absent
    #[error("Dataset source {dataset} requires setting {key}")]
    MissingDatasetConfig { dataset: String, key: String },

    /// Configuration sources could not be read or merged
    #[error("Failed to load configuration: {0}")]
    Load(String),
}

/// Dataset source errors
#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    /// Underlying data could not be read
    #[error("Dataset {dataset} unavailable: {message}")]
    Unavailable { dataset: String, message: String },

    /// Source has no records to sample from
    #[error("Dataset {dataset} has no records")]
    Empty { dataset: String },

    /// A record could not be decoded
    #[error("Dataset {dataset} has an invalid record at line {line}: {message}")]
    InvalidRecord {
        dataset: String,
        line: usize,
        message: String,
    },
}

/// Scoring errors raised by, or about, the scoring collaborator
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// The scorer failed for this candidate
    #[error("Scoring failed for {candidate}: {message}")]
    Failed { candidate: String, message: String },

    /// The scorer returned a value that is not a usable score
    #[error("Scorer returned invalid score {score} for {candidate}")]
    InvalidScore { candidate: String, score: f64 },
}

/// Checkpoint storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem operation failed
    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },

    /// Checkpoint payload could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Checkpoint exists but cannot be trusted
    #[error("Corrupt checkpoint {path}: {reason}")]
    Corrupt { path: String, reason: String },
}

/// Pipeline-wide result type
pub type EvalResult<T> = Result<T, EvalError>;
