// Defines a custom error type and a result type alias using the thiserror crate.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Identity string cannot be mapped to a record file (empty or contains
    /// path-unsafe characters). Rejected up front rather than normalized.
    #[error("invalid identity: {0:?}")]
    InvalidIdentity(String),

    #[error("account already exists: {0}")]
    AccountExists(String),

    /// Covers both "no such account" and "wrong password"; the caller
    /// cannot tell the two apart.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No record exists for the identity.
    #[error("no data for identity: {0}")]
    NoData(String),

    #[error("task name must not be empty")]
    InvalidTaskName,

    #[error("task already exists: {0}")]
    TaskExists(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    // The #[from] attribute automatically converts the underlying error
    // into an AppError using the From trait.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Custom result type
pub type AppResult<T> = Result<T, AppError>;
