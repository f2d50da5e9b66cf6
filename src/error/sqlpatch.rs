use thiserror::Error as ThisError;

use super::{BackendError, ExecutionError, LoadError};

#[derive(Debug, ThisError)]
pub enum SqlpatchError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Execution(#[from] Box<ExecutionError>),

    #[error("Patch {0} is recorded as applied but is missing from the catalog")]
    UnknownPatch(String),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl From<ExecutionError> for SqlpatchError {
    fn from(e: ExecutionError) -> Self {
        SqlpatchError::Execution(Box::new(e))
    }
}

impl From<figment::Error> for SqlpatchError {
    fn from(e: figment::Error) -> Self {
        SqlpatchError::Config(Box::new(e))
    }
}

impl From<sqlx::Error> for SqlpatchError {
    fn from(e: sqlx::Error) -> Self {
        SqlpatchError::Backend(BackendError::Database(e))
    }
}
