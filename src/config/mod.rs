mod basic;
mod patcher;

pub use basic::BasicConfig;
pub use patcher::{PatcherConfig, StorerConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::SqlpatchError;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct Config {
    /// Database and logging settings (see `basic` table in sqlpatch.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Patch source settings (see `patcher` table in sqlpatch.toml).
    #[serde(default)]
    pub patcher: PatcherConfig,

    /// Applied-state table settings (see `storer` table in sqlpatch.toml).
    #[serde(default)]
    pub storer: StorerConfig,
}

pub const DEFAULT_CONFIG_FILE: &str = "sqlpatch.toml";
const ENV_PREFIX: &str = "SQLPATCH_";

impl Config {
    /// Builds a Figment that merges defaults, a TOML file if present, and
    /// `SQLPATCH_`-prefixed environment variables (`__` separates tables).
    pub fn figment(file: &Path) -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = if file.is_file() {
            figment.merge(Toml::file(file))
        } else {
            figment
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration from `file`, or from `sqlpatch.toml` when `None`.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(file: Option<&Path>) -> Result<Self, SqlpatchError> {
        let path = match file {
            Some(path) if !path.is_file() => {
                return Err(figment::Error::from(format!(
                    "config file not found: {}",
                    path.display()
                ))
                .into());
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };
        Ok(Self::figment(&path).extract()?)
    }
}
