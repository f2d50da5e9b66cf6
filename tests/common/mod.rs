#![allow(dead_code)]

use sqlpatch::{Catalog, Patch, Transaction};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::time::SystemTime;

/// Single-connection in-memory database; every handle sees the same data.
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

/// Fresh, empty directory under the system temp dir.
pub fn temp_dir(label: &str) -> PathBuf {
    let mut hasher = DefaultHasher::new();
    SystemTime::now().hash(&mut hasher);
    label.hash(&mut hasher);
    std::thread::current().id().hash(&mut hasher);
    let dir = std::env::temp_dir().join(format!("sqlpatch_{label}_{:016x}", hasher.finish()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn tx(queries: &[&str], rollbacks: &[&str]) -> Transaction {
    Transaction::new(
        queries.iter().map(|s| s.to_string()).collect(),
        rollbacks.iter().map(|s| s.to_string()).collect(),
    )
}

pub fn catalog(patches: Vec<Patch>) -> Catalog {
    let mut catalog = Catalog::new();
    for patch in patches {
        assert!(catalog.insert(patch));
    }
    catalog
}

pub fn log_insert(entry: &str) -> String {
    format!("INSERT INTO log (entry) VALUES ('{entry}')")
}

pub async fn create_log(pool: &SqlitePool) {
    sqlx::query("CREATE TABLE log (id INTEGER PRIMARY KEY AUTOINCREMENT, entry TEXT NOT NULL)")
        .execute(pool)
        .await
        .unwrap();
}

pub async fn log_entries(pool: &SqlitePool) -> Vec<String> {
    sqlx::query_scalar::<_, String>("SELECT entry FROM log ORDER BY id")
        .fetch_all(pool)
        .await
        .unwrap()
}

pub async fn table_exists(pool: &SqlitePool, name: &str) -> bool {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap();
    count > 0
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
