//! Shared configuration and telemetry for the finetune evaluation pipeline.
//!
//! This crate provides:
//! - Configuration management (files, environment, validation)
//! - Structured logging initialization

pub mod config;
pub mod telemetry;

pub use config::{
    AppConfig, DatasetsConfig, PipelineConfig, RegistryConfig, ScoringConfig, TelemetryConfig,
};
pub use telemetry::init_tracing;

/// Common error type used throughout the crate
pub type Result<T> = std::result::Result<T, anyhow::Error>;
