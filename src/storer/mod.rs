//! Durable record of applied patches, grouped into numbered batches.
//!
//! Layout:
//! - `sql.rs`: table-backed storer on a SQLite pool
//! - `memory.rs`: in-process storer with the same contract

mod memory;
mod sql;

pub use memory::MemoryStorer;
pub use sql::SqlStorer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::BackendError;

/// Default name of the applied-state table.
pub const DEFAULT_TABLE: &str = "sqlpatch";

/// One applied-state record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AppliedPatch {
    pub patch: String,
    pub batch: i64,
}

/// Bookkeeping backend consumed by the patcher.
///
/// Implementations hold no migration logic. Batch numbers start at 1 and each
/// `insert_batch` uses one more than the current maximum.
#[async_trait]
pub trait Storer: Send + Sync {
    /// Creates the backing record if it does not exist yet.
    async fn init(&self) -> Result<(), BackendError>;

    /// Returns the names in `candidates` with no record, in their input order.
    async fn delta(&self, candidates: &[String]) -> Result<Vec<String>, BackendError>;

    /// Returns the names of the highest batch, or an empty list.
    async fn last_batch(&self) -> Result<Vec<String>, BackendError>;

    /// Records every name under a new batch number, all or nothing.
    async fn insert_batch(&self, names: &[String]) -> Result<(), BackendError>;

    /// Removes every record of the highest batch.
    async fn delete_last_batch(&self) -> Result<(), BackendError>;

    /// Every record, ordered by batch then patch name.
    async fn list(&self) -> Result<Vec<AppliedPatch>, BackendError>;
}
