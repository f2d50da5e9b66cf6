mod common;

use common::{strings, temp_dir};
use sqlpatch::config::{BasicConfig, StorerConfig};
use sqlpatch::{Config, Patcher, PatcherConfig, SqlpatchError, Storer};
use std::fs;

#[tokio::test]
async fn test_open_init_patch_rollback_on_file_database() {
    let dir = temp_dir("open_e2e");
    let patches = dir.join("patches");
    fs::create_dir_all(&patches).unwrap();
    fs::write(
        patches.join("001_init.json"),
        r#"[{"queries": ["CREATE TABLE t(id INT)"], "rollbacks": ["DROP TABLE t"]}]"#,
    )
    .unwrap();
    fs::write(patches.join("002_seed.sql"), "INSERT INTO t VALUES (1);\nINSERT INTO t VALUES (2);").unwrap();
    fs::write(patches.join("002_seed_rollback.sql"), "DELETE FROM t;").unwrap();

    let db_path = dir.join("target.sqlite");
    let cfg = Config {
        basic: BasicConfig {
            database_url: format!("sqlite:{}", db_path.to_str().unwrap()),
            ..Default::default()
        },
        patcher: PatcherConfig {
            patches_directory_path: patches.to_string_lossy().into_owned(),
        },
        storer: StorerConfig {
            table: "applied_patches".to_string(),
        },
    };

    let patcher = Patcher::open(&cfg).await.unwrap();
    assert_eq!(
        patcher.catalog().sorted_names(),
        &strings(&["001_init", "002_seed"])
    );

    patcher.init().await.unwrap();
    patcher.init().await.unwrap();
    patcher.patch().await.unwrap();

    let pool = sqlpatch::db::connect(&cfg.basic.database_url).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM t")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 2);

    let status = patcher.status().await.unwrap();
    assert!(status.pending.is_empty());
    assert_eq!(status.applied.len(), 2);
    assert!(status.applied.iter().all(|r| r.batch == 1));

    patcher.rollback().await.unwrap();
    let tables: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 't'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(tables, 0);
    assert!(patcher.storer().last_batch().await.unwrap().is_empty());

    pool.close().await;
    drop(patcher);
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_open_rejects_bad_storer_table() {
    let dir = temp_dir("open_bad_table");
    let cfg = Config {
        basic: BasicConfig {
            database_url: format!("sqlite:{}", dir.join("db.sqlite").to_str().unwrap()),
            ..Default::default()
        },
        storer: StorerConfig {
            table: "bad-name".to_string(),
        },
        ..Default::default()
    };

    let err = Patcher::open(&cfg).await.err().unwrap();
    assert!(matches!(err, SqlpatchError::Backend(_)));

    let _ = fs::remove_dir_all(&dir);
}
