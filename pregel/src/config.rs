use crate::errors::ConfigError;
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_MAX_ITERATIONS: usize = 20;
pub const DEFAULT_MAX_CONCURRENCY: usize = 64;
pub const MAX_THREADS_ENV: &str = "PREGEL_MAX_THREADS";

/// How the node-id space is split into units of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partitioning {
    /// Equal-sized id ranges, fixed for the whole run.
    #[default]
    Range,
    /// Ranges holding roughly the same number of relationships, fixed for the whole run.
    Degree,
    /// Recursive splitting on a work-stealing pool, re-balanced every superstep.
    Auto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PregelConfig {
    pub max_iterations: usize,
    pub concurrency: usize,
    pub is_asynchronous: bool,
    pub partitioning: Partitioning,
    /// Whether `send_to_neighbours` applies the computation's relationship weight function.
    pub relationship_weighted: bool,
    pub max_concurrency: usize,
}

impl Default for PregelConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            concurrency: default_concurrency().min(DEFAULT_MAX_CONCURRENCY),
            is_asynchronous: false,
            partitioning: Partitioning::default(),
            relationship_weighted: false,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl PregelConfig {
    pub fn builder() -> PregelConfigBuilder {
        PregelConfig::default().into()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 || self.concurrency > self.max_concurrency {
            return Err(ConfigError::Concurrency {
                concurrency: self.concurrency,
                max: self.max_concurrency,
            });
        }
        Ok(())
    }

    pub fn uses_fork_join(&self) -> bool {
        self.partitioning == Partitioning::Auto
    }
}

/// Worker count from `PREGEL_MAX_THREADS`, or the available parallelism.
pub fn default_concurrency() -> usize {
    let available = || {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    };
    match std::env::var(MAX_THREADS_ENV) {
        Ok(value) => match value.parse::<usize>() {
            Ok(threads) if threads > 0 => threads,
            _ => {
                warn!("Ignoring {MAX_THREADS_ENV}={value}, expected a positive number");
                available()
            }
        },
        Err(_) => available(),
    }
}

pub struct PregelConfigBuilder {
    config: PregelConfig,
}

impl From<PregelConfig> for PregelConfigBuilder {
    fn from(config: PregelConfig) -> Self {
        Self { config }
    }
}

impl PregelConfigBuilder {
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    pub fn is_asynchronous(mut self, is_asynchronous: bool) -> Self {
        self.config.is_asynchronous = is_asynchronous;
        self
    }

    pub fn partitioning(mut self, partitioning: Partitioning) -> Self {
        self.config.partitioning = partitioning;
        self
    }

    pub fn relationship_weighted(mut self, relationship_weighted: bool) -> Self {
        self.config.relationship_weighted = relationship_weighted;
        self
    }

    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    pub fn build(self) -> PregelConfig {
        self.config
    }
}

// Order of precedence: values in the file at `config_path` >> `config` >> defaults.
// Any key missing from the file keeps the value it had in `config`.
pub fn load_config(
    config: Option<PregelConfig>,
    config_path: Option<PathBuf>,
) -> Result<PregelConfig, ConfigError> {
    let config = config.unwrap_or_default();
    let json = serde_json::to_string(&config)?;
    let mut builder = Config::builder().add_source(File::from_str(&json, FileFormat::Json));
    if let Some(config_path) = config_path.as_ref() {
        builder = builder.add_source(File::from(config_path.clone()));
    }
    let load_err = |source| ConfigError::Load {
        path: config_path.clone(),
        source,
    };
    let config = builder
        .build()
        .map_err(load_err)?
        .try_deserialize::<PregelConfig>()
        .map_err(load_err)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn builder_overrides_defaults() {
        let config = PregelConfig::builder()
            .max_iterations(3)
            .concurrency(2)
            .partitioning(Partitioning::Degree)
            .is_asynchronous(true)
            .build();
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.partitioning, Partitioning::Degree);
        assert!(config.is_asynchronous);
        assert!(!config.uses_fork_join());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_illegal_concurrency() {
        let zero = PregelConfig::builder().concurrency(0).build();
        assert!(matches!(
            zero.validate(),
            Err(ConfigError::Concurrency { concurrency: 0, .. })
        ));

        let too_many = PregelConfig::builder()
            .concurrency(42)
            .max_concurrency(4)
            .build();
        assert!(matches!(
            too_many.validate(),
            Err(ConfigError::Concurrency {
                concurrency: 42,
                max: 4
            })
        ));
    }

    #[test]
    fn file_takes_precedence_over_supplied_config() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "max_iterations = 7\npartitioning = \"auto\"").unwrap();

        let supplied = PregelConfig::builder().concurrency(3).max_iterations(2).build();
        let loaded = load_config(Some(supplied), Some(file.path().to_path_buf())).unwrap();

        assert_eq!(loaded.max_iterations, 7);
        assert_eq!(loaded.partitioning, Partitioning::Auto);
        assert_eq!(loaded.concurrency, 3);
    }

    #[test]
    fn loaded_config_is_validated() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "concurrency = 0").unwrap();
        let err = load_config(None, Some(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, ConfigError::Concurrency { .. }));
    }
}
