//! Proto API synchronization engine
//!
//! Takes the definition files produced by an upstream transform, places
//! them at their canonical paths, regenerates the per-directory build
//! manifests, reconciles active and next-major renditions, and either
//! reports how the live API tree diverges or rewrites it to match.
//!
//! The pieces, bottom-up:
//!
//! - [`descriptor`]: header metadata of a single file
//! - [`paths`]: canonical destination paths and the extension-area rule
//! - [`deps`]: import and history dependencies of a directory
//! - [`manifest`]: rendering of the BUILD manifest
//! - [`merger`]: turning one or two candidates into a destination file
//! - [`sync`]: the full pass over a tree

pub mod candidates;
pub mod config;
pub mod deps;
pub mod descriptor;
pub mod error;
pub mod manifest;
pub mod merger;
pub mod paths;
pub mod policy;
pub mod sync;
pub mod tools;

pub use candidates::{Candidate, CandidateKind, CandidateSet, Label, SyncGate};
pub use config::{SyncConfig, ToolsConfig};
pub use deps::{DependencyResolver, DirectoryDeps};
pub use descriptor::DefinitionFile;
pub use error::{Error, Result};
pub use paths::PathResolver;
pub use policy::NamespacePolicy;
pub use sync::{Confirm, SyncMode, SyncOutcome, SyncRequest, TreeDiff, TreeSynchronizer};
pub use tools::{DefinitionTools, ExternalTools};
