//! Statement execution with per-transaction atomicity and compensation.
//!
//! Each patch transaction runs inside its own database transaction. When one
//! fails, the transactions already committed by the same call are undone by
//! running their authored `rollbacks`, newest first. Backends that auto-commit
//! DDL make the database abort alone insufficient for that.

use sqlpatch_catalog::{Patch, Transaction};
use sqlx::SqlitePool;
use tracing::{debug, error, info, warn};

use crate::error::{CompensationFailure, ExecutionError};

#[derive(Debug, Clone)]
pub struct Engine {
    pool: SqlitePool,
}

/// A transaction committed during the current apply.
struct Committed<'a> {
    patch: &'a str,
    index: usize,
    transaction: &'a Transaction,
}

impl Engine {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Runs every transaction's `queries`, patches in the given order.
    ///
    /// On failure the committed prefix is compensated before returning; any
    /// compensation that itself fails is attached to the returned error.
    pub async fn apply(&self, patches: &[&Patch]) -> Result<(), ExecutionError> {
        let mut committed: Vec<Committed<'_>> = Vec::new();

        for patch in patches {
            debug!(
                patch = %patch.name,
                transactions = patch.transactions.len(),
                queries = patch.query_count(),
                "applying patch"
            );
            for (index, transaction) in patch.transactions.iter().enumerate() {
                if let Err(mut err) = self
                    .run_atomic(&patch.name, index, &transaction.queries)
                    .await
                {
                    err.compensation_failures = self.compensate(&committed).await;
                    return Err(err);
                }
                committed.push(Committed {
                    patch: &patch.name,
                    index,
                    transaction,
                });
            }
        }
        Ok(())
    }

    /// Runs every transaction's `rollbacks`, patches and transactions in reverse.
    ///
    /// Statement order inside one rollback list is kept. Stops at the first failure.
    pub async fn revert(&self, patches: &[&Patch]) -> Result<(), ExecutionError> {
        for patch in patches.iter().rev() {
            debug!(patch = %patch.name, "rolling back patch");
            for (index, transaction) in patch.transactions.iter().enumerate().rev() {
                self.run_atomic(&patch.name, index, &transaction.rollbacks)
                    .await?;
            }
        }
        Ok(())
    }

    async fn compensate(&self, committed: &[Committed<'_>]) -> Vec<CompensationFailure> {
        if committed.is_empty() {
            return Vec::new();
        }
        info!(count = committed.len(), "compensating committed transactions");

        let mut failures = Vec::new();
        for c in committed.iter().rev() {
            if c.transaction.rollbacks.is_empty() {
                warn!(
                    patch = %c.patch,
                    transaction = c.index,
                    "committed transaction has no rollbacks; its effects remain"
                );
                continue;
            }
            if let Err(e) = self
                .run_atomic(c.patch, c.index, &c.transaction.rollbacks)
                .await
            {
                error!(
                    patch = %c.patch,
                    transaction = c.index,
                    error = %e,
                    "compensation failed"
                );
                failures.push(CompensationFailure::from(e));
            }
        }
        failures
    }

    /// Executes `statements` inside one database transaction.
    ///
    /// The transaction is aborted on the first failing statement. Dropping the
    /// future mid-flight aborts it as well.
    async fn run_atomic(
        &self,
        patch: &str,
        index: usize,
        statements: &[String],
    ) -> Result<(), ExecutionError> {
        if statements.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ExecutionError::new(patch, index, "BEGIN", e))?;

        for statement in statements {
            debug!(patch, transaction = index, statement = %statement, "executing statement");
            if let Err(e) = sqlx::raw_sql(statement).execute(&mut *tx).await {
                error!(
                    patch,
                    transaction = index,
                    statement = %statement,
                    error = %e,
                    "statement failed"
                );
                if let Err(abort) = tx.rollback().await {
                    error!(patch, transaction = index, error = %abort, "failed to abort transaction");
                }
                return Err(ExecutionError::new(patch, index, statement.as_str(), e));
            }
        }

        tx.commit()
            .await
            .map_err(|e| ExecutionError::new(patch, index, "COMMIT", e))
    }
}
