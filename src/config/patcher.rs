use serde::{Deserialize, Serialize};

/// Settings consumed by `Patcher::load`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct PatcherConfig {
    /// Directory walked for `*.json` and `*.sql` patch files.
    /// TOML: `patcher.patches_directory_path`. Default: empty (no patches).
    #[serde(default)]
    pub patches_directory_path: String,
}

/// Settings for the table-backed storer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorerConfig {
    /// Table holding `(patch, batch)` records.
    /// TOML: `storer.table`. Default: `sqlpatch`.
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for StorerConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
        }
    }
}

fn default_table() -> String {
    crate::storer::DEFAULT_TABLE.to_string()
}
