//! Configuration management for the evaluation pipeline.
//!
//! Settings are merged from several sources, later ones overriding earlier
//! ones:
//!
//! 1. built-in defaults
//! 2. `config/default.toml` (if present)
//! 3. `config/{APP_ENV}.toml` (if present)
//! 4. an explicit file passed by the caller
//! 5. environment variables prefixed with `FINETUNE_EVAL`, e.g.
//!    `FINETUNE_EVAL__PIPELINE__SAMPLE_SIZE=50`
//!
//! Command-line flags are applied on top by the binary.
//!
//! ## Example Configuration
//!
//! ```toml
//! [pipeline]
//! source_name = "bigcodebench"
//! sample_size = 1000
//! checkpoint_dir = "/var/lib/finetune-eval"
//!
//! [datasets]
//! bigcodebench_path = "data/bigcodebench.jsonl"
//! seed = 7
//!
//! [registry]
//! candidates_path = "data/candidates.json"
//!
//! [scoring]
//! command = ["python", "-m", "score"]
//! similarity_model = "code-sim"
//! ```

use anyhow::{Context, Result};
use finetune_eval_domain::{CompetitionId, ConfigurationError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "FINETUNE_EVAL";
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub datasets: DatasetsConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Dataset source the task set is drawn from
    #[serde(default = "default_source_name")]
    pub source_name: String,

    /// Number of tasks in a competition's task set
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Competition used when none is given on the command line
    #[serde(default)]
    pub competition_id: Option<String>,

    /// Directory holding checkpoint files
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: PathBuf,
}

/// Dataset source settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetsConfig {
    /// JSONL file backing the `bigcodebench` source
    #[serde(default)]
    pub bigcodebench_path: Option<PathBuf>,

    /// Sampling seed; drawn from entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Candidate registry settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// JSON manifest of submitted candidates
    #[serde(default)]
    pub candidates_path: Option<PathBuf>,
}

/// External scorer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Program and leading arguments of the scorer
    #[serde(default)]
    pub command: Vec<String>,

    /// Similarity model name forwarded to the scorer
    #[serde(default = "default_similarity_model")]
    pub similarity_model: String,
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Enable JSON logging format
    #[serde(default)]
    pub json_logging: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_source_name() -> String {
    "bigcodebench".to_string()
}

fn default_sample_size() -> usize {
    1000
}

fn default_checkpoint_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_similarity_model() -> String {
    "code-sim".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_name: default_source_name(),
            sample_size: default_sample_size(),
            competition_id: None,
            checkpoint_dir: default_checkpoint_dir(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            similarity_model: default_similarity_model(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json_logging: false,
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment variables.
    ///
    /// `explicit` is an additional file layered over the `config/` directory
    /// files; unlike those, it must exist.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use finetune_eval_common::config::AppConfig;
    ///
    /// let config = AppConfig::load(None).expect("Failed to load configuration");
    /// println!("Checkpoints go to {}", config.pipeline.checkpoint_dir.display());
    /// ```
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(" ")
                    .with_list_parse_key("scoring.command"),
            )
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        if self.pipeline.sample_size == 0 {
            return Err(ConfigurationError::InvalidValue {
                key: "pipeline.sample_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        if self.pipeline.source_name.trim().is_empty() {
            return Err(ConfigurationError::Missing("pipeline.source_name".to_string()));
        }

        if let Some(id) = &self.pipeline.competition_id {
            CompetitionId::parse(id)?;
        }

        if !VALID_LOG_LEVELS.contains(&self.telemetry.log_level.as_str()) {
            return Err(ConfigurationError::InvalidValue {
                key: "telemetry.log_level".to_string(),
                message: format!(
                    "'{}' is not one of: {}",
                    self.telemetry.log_level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        Ok(())
    }

    /// Resolve the active competition, preferring an explicit override.
    pub fn competition_id(
        &self,
        override_id: Option<&str>,
    ) -> std::result::Result<CompetitionId, ConfigurationError> {
        match override_id.or(self.pipeline.competition_id.as_deref()) {
            Some(id) => CompetitionId::parse(id),
            None => Err(ConfigurationError::Missing(
                "pipeline.competition_id".to_string(),
            )),
        }
    }
}
