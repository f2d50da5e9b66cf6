use serde::{Deserialize, Serialize};

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BasicConfig {
    /// Database URL for SQLite, the migration target and the storer backend.
    /// TOML: `basic.database_url`. Default: `sqlite://data.db`.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            loglevel: default_loglevel(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://data.db".to_string()
}

fn default_loglevel() -> String {
    "info".to_string()
}
