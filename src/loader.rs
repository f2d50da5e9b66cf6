//! Builds a [`Catalog`] from a patches directory.
//!
//! Two file formats are understood:
//! - `<name>.json`: a JSON array of `{ "queries": [..], "rollbacks": [..] }` transactions
//! - `<name>.sql` plus optional `<name>_rollback.sql`: one transaction whose
//!   statements are separated by `;`
//!
//! A patch name is its path relative to the directory, extension stripped,
//! components joined with `/`. Entries are walked in file-name order and
//! symlinked directories are skipped.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sqlpatch_catalog::{Catalog, Patch, Transaction, split_statements};
use tracing::{debug, warn};

use crate::config::PatcherConfig;
use crate::error::LoadError;

const ROLLBACK_SUFFIX: &str = "_rollback";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatchFile {
    Json,
    Sql,
    SqlRollback,
}

#[derive(Debug, Default)]
struct StagedSql {
    queries: Vec<String>,
    rollbacks: Vec<String>,
}

/// Loads the catalog named by `config`; an empty path yields an empty catalog.
pub fn load_catalog(config: &PatcherConfig) -> Result<Catalog, LoadError> {
    if config.patches_directory_path.is_empty() {
        debug!("no patches directory configured; catalog is empty");
        return Ok(Catalog::new());
    }
    load_from_dir(Path::new(&config.patches_directory_path))
}

/// Walks `root` recursively and loads every patch file found.
pub fn load_from_dir(root: &Path) -> Result<Catalog, LoadError> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(LoadError::NotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(LoadError::NotFound(root.to_path_buf()));
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: root.to_path_buf(),
                source,
            });
        }
    }
    debug!(path = %root.display(), "loading patches");

    let mut files = Vec::new();
    collect_files(root, &mut files)?;

    let mut catalog = Catalog::new();
    let mut staged: BTreeMap<String, StagedSql> = BTreeMap::new();

    for path in files {
        let Some(kind) = classify(&path) else {
            debug!(path = %path.display(), "skipping non-patch file");
            continue;
        };
        let name = patch_name(root, &path, kind);
        let contents = fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;

        match kind {
            PatchFile::Json => {
                let patch = Patch::from_json(name, &contents)
                    .map_err(|source| LoadError::Json { path, source })?;
                add(&mut catalog, patch);
            }
            PatchFile::Sql | PatchFile::SqlRollback => {
                let statements = split_statements(&contents);
                if statements.is_empty() {
                    debug!(path = %path.display(), "no statements in sql file");
                    continue;
                }
                let entry = staged.entry(name).or_default();
                if kind == PatchFile::SqlRollback {
                    entry.rollbacks.extend(statements);
                } else {
                    entry.queries.extend(statements);
                }
            }
        }
    }

    for (name, sql) in staged {
        if sql.queries.is_empty() {
            warn!(patch = %name, "rollback file has no matching patch file; skipping");
            continue;
        }
        let patch = Patch::new(name, vec![Transaction::new(sql.queries, sql.rollbacks)]);
        add(&mut catalog, patch);
    }

    debug!(count = catalog.len(), "patches loaded");
    Ok(catalog)
}

fn add(catalog: &mut Catalog, patch: Patch) {
    let name = patch.name.clone();
    let transactions = patch.transactions.len();
    if catalog.insert(patch) {
        debug!(patch = %name, transactions, "patch added");
    } else {
        warn!(patch = %name, "duplicate patch name; keeping the first one loaded");
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.and_then(|e| Ok((e.path(), e.file_type()?))))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    // `file_type` does not follow links; linked directories are never walked.
    for (path, file_type) in entries {
        if file_type.is_dir() {
            collect_files(&path, out)?;
        } else if file_type.is_symlink() && path.is_dir() {
            warn!(path = %path.display(), "skipping symlinked directory");
        } else {
            out.push(path);
        }
    }
    Ok(())
}

fn classify(path: &Path) -> Option<PatchFile> {
    let ext = path.extension().and_then(|s| s.to_str())?;
    if ext.eq_ignore_ascii_case("json") {
        return Some(PatchFile::Json);
    }
    if !ext.eq_ignore_ascii_case("sql") {
        return None;
    }
    let stem = path.file_stem().and_then(|s| s.to_str())?;
    if stem.ends_with(ROLLBACK_SUFFIX) {
        Some(PatchFile::SqlRollback)
    } else {
        Some(PatchFile::Sql)
    }
}

fn patch_name(root: &Path, path: &Path, kind: PatchFile) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut parts: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    let mut stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if kind == PatchFile::SqlRollback && stem.ends_with(ROLLBACK_SUFFIX) {
        stem.truncate(stem.len() - ROLLBACK_SUFFIX.len());
    }
    parts.push(stem);
    parts.join("/")
}
