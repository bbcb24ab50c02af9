//! Version-control queries for protosync
//!
//! The synchronizer needs two answers from version control: which files in
//! the API tree carry uncommitted changes (so a fix pass can ask before
//! overwriting them) and which files changed since the last upstream merge
//! (so unchanged destinations can skip regeneration).

pub mod error;
pub mod git;
pub mod provider;
pub mod status;

pub use error::{Error, Result};
pub use git::GitSourceControl;
pub use provider::{NoSourceControl, SourceControl, open_source_control};
