use std::path::PathBuf;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum LoadError {
    #[error("Patches directory not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Patches path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed patch document {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
