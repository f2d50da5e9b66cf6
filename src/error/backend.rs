use thiserror::Error as ThisError;

/// Failure reading or writing the applied-state record.
#[derive(Debug, ThisError)]
pub enum BackendError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid storer table name: {0:?}")]
    InvalidTableName(String),

    #[error("Storer error: {0}")]
    Other(String),
}
