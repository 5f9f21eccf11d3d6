use thiserror::Error;

#[derive(Debug, Error)]
pub enum StructureError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid outline: {0}")]
    InvalidOutline(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Structure analysis was cancelled")]
    Cancelled,

    #[error("Detector task failed: {0}")]
    TaskFailed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StructureError>;
