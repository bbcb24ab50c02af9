//! Error types for protosync-core

use std::path::PathBuf;

/// Result type for protosync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in protosync-core operations
///
/// None of these are retried. Each aborts the current sync pass.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or duplicate package declaration
    #[error(
        "Expected {path} to have exactly one package declaration but found {count}; \
         re-run the proto formatter on it before syncing"
    )]
    Format { path: PathBuf, count: usize },

    /// Extension package outside the unstable namespaces and not allow-listed
    #[error(
        "contrib extension package '{package}' does not use an unstable version namespace. \
         Add it to the contrib allow-list with an explanation if this is on purpose"
    )]
    NamespaceViolation { package: String },

    /// Import path with no dependency mapping
    #[error(
        "Unknown import path mapping for {import} (imported by {path}); \
         add it to the external dependency mappings"
    )]
    UnmappedImport { import: String, path: PathBuf },

    /// External merge or print step failed
    #[error("{tool} failed for {target}: {detail}")]
    ExternalTool {
        tool: String,
        target: PathBuf,
        detail: String,
    },

    /// Build-output label that cannot be mapped to artifacts
    #[error("Invalid label '{label}': expected [@repo]//<package>:<file>")]
    InvalidLabel { label: String },

    /// Destination path with an impossible combination of candidates
    #[error("Conflicting candidates for {destination}: {candidates:?}")]
    CandidateConflict {
        destination: PathBuf,
        candidates: Vec<PathBuf>,
    },

    /// Destination the comparison would never see
    #[error(
        "Destination {destination} lies outside the synchronized part of the API tree \
         (tracked roots and ignored paths in the namespace policy)"
    )]
    UntrackedDestination { destination: PathBuf },

    /// Worker pool could not be created
    #[error("Failed to start worker pool: {message}")]
    WorkerPool { message: String },

    /// The user declined a confirmation gate
    #[error("Aborted: {reason}")]
    Aborted { reason: String },

    /// Filesystem error from protosync-fs
    #[error(transparent)]
    Fs(#[from] protosync_fs::Error),

    /// Version-control error from protosync-git
    #[error(transparent)]
    Git(#[from] protosync_git::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::Aborted {
            reason: reason.into(),
        }
    }
}
