//! Command implementations

pub mod sync;

pub use sync::{RunStatus, run_sync};
