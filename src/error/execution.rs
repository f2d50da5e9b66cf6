use thiserror::Error as ThisError;

/// A statement failed while applying or rolling back a patch.
///
/// `transaction` is the 0-based index of the transaction within `patch`.
/// `statement` is the failing SQL text, or `BEGIN`/`COMMIT` when the
/// surrounding database transaction itself could not be opened or closed.
#[derive(Debug, ThisError)]
#[error("Patch {patch} transaction {transaction} failed on `{statement}`: {source}")]
pub struct ExecutionError {
    pub patch: String,
    pub transaction: usize,
    pub statement: String,
    #[source]
    pub source: sqlx::Error,

    /// Compensations that failed after this error; never replaces it.
    pub compensation_failures: Vec<CompensationFailure>,
}

impl ExecutionError {
    pub fn new(
        patch: impl Into<String>,
        transaction: usize,
        statement: impl Into<String>,
        source: sqlx::Error,
    ) -> Self {
        Self {
            patch: patch.into(),
            transaction,
            statement: statement.into(),
            source,
            compensation_failures: Vec::new(),
        }
    }
}

/// A rollback statement that failed while compensating a failed apply.
#[derive(Debug, ThisError)]
#[error("Compensation of patch {patch} transaction {transaction} failed on `{statement}`: {source}")]
pub struct CompensationFailure {
    pub patch: String,
    pub transaction: usize,
    pub statement: String,
    #[source]
    pub source: sqlx::Error,
}

impl From<ExecutionError> for CompensationFailure {
    fn from(e: ExecutionError) -> Self {
        Self {
            patch: e.patch,
            transaction: e.transaction,
            statement: e.statement,
            source: e.source,
        }
    }
}
