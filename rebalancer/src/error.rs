//! Error types for the rebalancer.

use std::path::PathBuf;

use sleevebook::{PlanError, StrategyError};

/// All errors that can occur during a rebalancer run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {file} config: {source}")]
    ConfigParse {
        file: &'static str,
        source: toml::de::Error,
    },

    #[error("failed to read target overrides {path}: {source}")]
    StoreRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse target overrides {path}: {source}")]
    StoreParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to write target overrides: {0}")]
    StoreWrite(String),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("plan checks failed: {0}")]
    ChecksFailed(String),

    #[error("aborted: {0}")]
    Aborted(String),

    #[error("confirmation prompt failed: {0}; pass --force to save without asking")]
    Prompt(String),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("audit log error: {0}")]
    Audit(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
