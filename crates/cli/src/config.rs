//! Command-line overrides on top of the layered pipeline configuration.

use anyhow::Result;
use finetune_eval_common::AppConfig;
use std::path::{Path, PathBuf};

/// Settings given as flags; these win over files and the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub checkpoint_dir: Option<PathBuf>,
    pub dataset: Option<String>,
    pub sample_size: Option<usize>,
    pub verbose: bool,
}

impl Overrides {
    /// Apply the flags that were actually given.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.checkpoint_dir {
            config.pipeline.checkpoint_dir = dir.clone();
        }
        if let Some(dataset) = &self.dataset {
            config.pipeline.source_name = dataset.clone();
        }
        if let Some(sample_size) = self.sample_size {
            config.pipeline.sample_size = sample_size;
        }
        if self.verbose {
            config.telemetry.log_level = "debug".to_string();
        }
    }
}

/// Load the configuration, apply command-line overrides and validate.
pub fn load(config_file: Option<&Path>, overrides: &Overrides) -> Result<AppConfig> {
    let mut config = AppConfig::load(config_file)?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use finetune_eval_domain::ConfigurationError;

    #[test]
    fn test_empty_overrides_change_nothing() {
        let mut config = AppConfig::default();
        Overrides::default().apply(&mut config);

        assert_eq!(config.pipeline.source_name, "bigcodebench");
        assert_eq!(config.pipeline.sample_size, 1000);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = AppConfig::default();
        let overrides = Overrides {
            checkpoint_dir: Some(PathBuf::from("/tmp/ckpt")),
            dataset: Some("synthetic".into()),
            sample_size: Some(25),
            verbose: true,
        };

        overrides.apply(&mut config);

        assert_eq!(config.pipeline.checkpoint_dir, PathBuf::from("/tmp/ckpt"));
        assert_eq!(config.pipeline.source_name, "synthetic");
        assert_eq!(config.pipeline.sample_size, 25);
        assert_eq!(config.telemetry.log_level, "debug");
    }

    #[test]
    fn test_zero_sample_size_flag_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"[pipeline]\nsource_name = \"synthetic\"\n").unwrap();
        let overrides = Overrides {
            sample_size: Some(0),
            ..Overrides::default()
        };

        let err = load(Some(file.path()), &overrides).unwrap_err();

        assert!(err.downcast_ref::<ConfigurationError>().is_some());
    }

    #[test]
    fn test_explicit_file_is_read() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"[pipeline]\nsource_name = \"synthetic\"\nsample_size = 7\n",
        )
        .unwrap();

        let config = load(Some(file.path()), &Overrides::default()).unwrap();

        assert_eq!(config.pipeline.source_name, "synthetic");
        assert_eq!(config.pipeline.sample_size, 7);
    }
}
