// Error types - Validation and persistence failures

use thiserror::Error;

pub const EMPTY_TITLE: &str = "Title cannot be empty";

/// Failures of the blob store backing the task list.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to access record: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode tasks: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),
}

/// Errors surfaced to the presentation layer.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("{0}")]
    Validation(String),

    #[error("Changes may not be saved: {0}")]
    Persistence(#[from] StorageError),
}

impl TaskError {
    pub fn validation(msg: impl Into<String>) -> Self {
        TaskError::Validation(msg.into())
    }

    pub fn empty_title() -> Self {
        TaskError::validation(EMPTY_TITLE)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
