use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use super::{AppliedPatch, DEFAULT_TABLE, Storer};
use crate::error::BackendError;

/// Storer backed by a single `(patch, batch)` table.
#[derive(Debug, Clone)]
pub struct SqlStorer {
    pool: SqlitePool,
    table: String,
}

impl SqlStorer {
    /// Uses the default `sqlpatch` table.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            table: DEFAULT_TABLE.to_string(),
        }
    }

    /// Uses `table`, which must be a plain identifier since it is spliced into SQL.
    pub fn with_table(pool: SqlitePool, table: impl Into<String>) -> Result<Self, BackendError> {
        let table = table.into();
        if !is_identifier(&table) {
            return Err(BackendError::InvalidTableName(table));
        }
        Ok(Self { pool, table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[async_trait]
impl Storer for SqlStorer {
    async fn init(&self) -> Result<(), BackendError> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (patch TEXT NOT NULL, batch INTEGER NOT NULL)",
            self.table
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        debug!(table = %self.table, "storer table ready");
        Ok(())
    }

    async fn delta(&self, candidates: &[String]) -> Result<Vec<String>, BackendError> {
        let sql = format!("SELECT patch FROM {}", self.table);
        let applied: HashSet<String> = sqlx::query_scalar::<_, String>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .collect();

        Ok(candidates
            .iter()
            .filter(|name| !applied.contains(name.as_str()))
            .cloned()
            .collect())
    }

    async fn last_batch(&self) -> Result<Vec<String>, BackendError> {
        let sql = format!(
            "SELECT patch FROM {t} WHERE batch = (SELECT MAX(batch) FROM {t})",
            t = self.table
        );
        let names = sqlx::query_scalar::<_, String>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    async fn insert_batch(&self, names: &[String]) -> Result<(), BackendError> {
        if names.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        let max_sql = format!("SELECT COALESCE(MAX(batch), 0) FROM {}", self.table);
        let batch = sqlx::query_scalar::<_, i64>(&max_sql)
            .fetch_one(&mut *tx)
            .await?
            + 1;

        let insert_sql = format!("INSERT INTO {} (patch, batch) VALUES (?, ?)", self.table);
        for name in names {
            sqlx::query(&insert_sql)
                .bind(name)
                .bind(batch)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        debug!(table = %self.table, batch, count = names.len(), "batch recorded");
        Ok(())
    }

    async fn delete_last_batch(&self) -> Result<(), BackendError> {
        let sql = format!(
            "DELETE FROM {t} WHERE batch = (SELECT MAX(batch) FROM {t})",
            t = self.table
        );
        let res = sqlx::query(&sql).execute(&self.pool).await?;
        debug!(table = %self.table, deleted = res.rows_affected(), "last batch deleted");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<AppliedPatch>, BackendError> {
        let sql = format!(
            "SELECT patch, batch FROM {} ORDER BY batch, patch",
            self.table
        );
        let rows = sqlx::query_as::<_, AppliedPatch>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
