pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod loader;
pub mod patcher;
pub mod storer;

pub use config::{Config, PatcherConfig};
pub use error::SqlpatchError;
pub use patcher::{PatchStatus, Patcher};
pub use sqlpatch_catalog::{Catalog, Patch, Transaction};
pub use storer::{AppliedPatch, MemoryStorer, SqlStorer, Storer};
