use pregel_api::graph::GraphError;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Concurrency must be between 1 and {max}, got {concurrency}")]
    Concurrency { concurrency: usize, max: usize },
    #[error("Failed to load config from {path:?}: {source}")]
    Load {
        path: Option<PathBuf>,
        source: config::ConfigError,
    },
    #[error("Failed to serialise config: {0}")]
    Serialise(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum PregelError {
    #[error("The Pregel algorithm {computation} requires inverse indexes")]
    MissingInverseIndex { computation: String },

    #[error("The reducer identity must not be the empty message sentinel (NaN)")]
    InvalidReducerIdentity,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("The execution has been terminated")]
    Terminated,

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
