//! Error types for protosync-git

use std::path::PathBuf;

/// Result type for protosync-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in protosync-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository at {path} has no working directory")]
    BareRepository { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
