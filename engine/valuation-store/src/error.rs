//! Error types for the PostgreSQL store

use thiserror::Error;
use valuation_engine::ValuationError;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in the PostgreSQL store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value that does not map back onto the data model
    #[error("Decode error: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// The engine only sees the database as an upstream collaborator
impl From<StoreError> for ValuationError {
    fn from(err: StoreError) -> Self {
        ValuationError::upstream("postgres", err.to_string())
    }
}
