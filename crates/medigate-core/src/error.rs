//! Medigate error type.

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, MedigateError>;

/// Errors surfaced by Medigate crates.
#[derive(Debug, thiserror::Error)]
pub enum MedigateError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Knowledge base error: {0}")]
    Knowledge(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}
