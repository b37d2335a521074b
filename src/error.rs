use crate::events::{AlertStatus, Timestamp};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in the storage layer
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate rule name: {0}")]
    DuplicateRule(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Errors that can occur during alert classification and lifecycle updates
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("alert title is required")]
    MissingTitle,

    #[error("unknown alert id: {0}")]
    UnknownAlert(Uuid),

    #[error("unknown rule: {0}")]
    UnknownRule(String),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: AlertStatus,
        to: AlertStatus,
    },

    #[error("store error: {0}")]
    StoreError(#[from] StoreError),
}

/// Errors that can occur during summary generation
#[derive(Error, Debug)]
pub enum SummaryError {
    /// The window contained no logs. Distinct from an empty summary:
    /// callers must not treat this as a zero-activity record.
    #[error("no logs between {start} and {end}")]
    NoLogs { start: Timestamp, end: Timestamp },

    #[error("store error: {0}")]
    StoreError(#[from] StoreError),
}

/// Errors that can occur during configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("invalid configuration value: {0}")]
    ValidationError(String),
}
