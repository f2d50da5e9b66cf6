//! The patcher facade: init, load, patch, rollback.

use serde::Serialize;
use sqlpatch_catalog::{Catalog, Patch};
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::config::{Config, PatcherConfig};
use crate::db;
use crate::engine::Engine;
use crate::error::SqlpatchError;
use crate::loader;
use crate::storer::{AppliedPatch, SqlStorer, Storer};

/// Applied records and catalog patches not yet applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatchStatus {
    pub applied: Vec<AppliedPatch>,
    pub pending: Vec<String>,
}

pub struct Patcher<S: Storer> {
    engine: Engine,
    storer: S,
    catalog: Catalog,
}

impl Patcher<SqlStorer> {
    /// Connects to `basic.database_url` and loads `patcher.patches_directory_path`,
    /// with the storer table living in the same database.
    pub async fn open(config: &Config) -> Result<Self, SqlpatchError> {
        let pool = db::connect(&config.basic.database_url).await?;
        let storer = SqlStorer::with_table(pool.clone(), config.storer.table.as_str())?;
        let mut patcher = Self::new(pool, storer);
        patcher.load(&config.patcher)?;
        Ok(patcher)
    }
}

impl<S: Storer> Patcher<S> {
    pub fn new(pool: SqlitePool, storer: S) -> Self {
        Self {
            engine: Engine::new(pool),
            storer,
            catalog: Catalog::new(),
        }
    }

    /// Replaces the catalog with one built in memory.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn storer(&self) -> &S {
        &self.storer
    }

    /// Prepares the storer backend. Safe to call repeatedly.
    pub async fn init(&self) -> Result<(), SqlpatchError> {
        self.storer.init().await?;
        info!("storer initialized");
        Ok(())
    }

    /// Builds the catalog from `config`. On failure the previous catalog is kept.
    pub fn load(&mut self, config: &PatcherConfig) -> Result<(), SqlpatchError> {
        self.catalog = loader::load_catalog(config)?;
        info!(count = self.catalog.len(), "catalog loaded");
        Ok(())
    }

    /// Applies every outstanding patch and records them as one batch.
    pub async fn patch(&self) -> Result<(), SqlpatchError> {
        let outstanding = self.storer.delta(self.catalog.sorted_names()).await?;
        if outstanding.is_empty() {
            info!("no patches to run");
            return Ok(());
        }

        let patches = self.resolve(&outstanding)?;
        info!(patches = ?outstanding, "running patches");
        self.engine.apply(&patches).await?;

        if let Err(e) = self.storer.insert_batch(&outstanding).await {
            error!(
                patches = ?outstanding,
                error = %e,
                "patches were applied but the batch could not be recorded"
            );
            return Err(e.into());
        }
        info!(count = outstanding.len(), "batch inserted");
        Ok(())
    }

    /// Undoes the last applied batch and removes its record.
    pub async fn rollback(&self) -> Result<(), SqlpatchError> {
        let names = self.storer.last_batch().await?;
        if names.is_empty() {
            info!("no patches to roll back");
            return Ok(());
        }

        let patches = self.resolve(&names)?;
        info!(patches = ?names, "rolling back last batch");
        self.engine.revert(&patches).await?;

        if let Err(e) = self.storer.delete_last_batch().await {
            error!(
                patches = ?names,
                error = %e,
                "rollbacks were executed but the batch record could not be deleted"
            );
            return Err(e.into());
        }
        info!(count = names.len(), "last batch deleted");
        Ok(())
    }

    pub async fn status(&self) -> Result<PatchStatus, SqlpatchError> {
        let applied = self.storer.list().await?;
        let pending = self.storer.delta(self.catalog.sorted_names()).await?;
        Ok(PatchStatus { applied, pending })
    }

    /// Maps stored names to catalog patches in catalog order.
    fn resolve(&self, names: &[String]) -> Result<Vec<&Patch>, SqlpatchError> {
        let (patches, unknown) = self.catalog.in_order(names);
        match unknown.into_iter().next() {
            Some(name) => Err(SqlpatchError::UnknownPatch(name)),
            None => Ok(patches),
        }
    }
}
