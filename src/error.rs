//! Error taxonomy shared by the store, the core and the services.

use thiserror::Error;

use crate::db::DbLockError;

pub type Result<T> = std::result::Result<T, StudyError>;

#[derive(Debug, Error)]
pub enum StudyError {
    /// Record absent, or present but owned by another user.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Generator output that could not be turned into cards or questions.
    #[error("malformed generator output: {0}")]
    MalformedContent(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    DbLock(#[from] DbLockError),
}

impl StudyError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedContent(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
