//! Error types for Cashcast

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Caller supplied bad input (horizon, owner, budget shape, edit)
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The backing store was unreachable or rejected the operation
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Pool(_) | Self::Encryption(_) | Self::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
