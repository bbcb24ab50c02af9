//! Filesystem layer for protosync
//!
//! Provides atomic file writes, deterministic tree listing, filtered tree
//! copies, scoped staging areas and TOML configuration loading.

pub mod config;
pub mod error;
pub mod io;
pub mod staging;
pub mod tree;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use staging::StagingArea;
pub use tree::{TreeFilter, copy_filtered, list_files};
