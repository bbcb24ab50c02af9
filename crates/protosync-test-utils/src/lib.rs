//! Shared test utilities for the protosync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fixture`]: [`ApiFixture`] scratch layout with a live API tree and an
//!   artifact root
//! - [`tools`]: fake printer and merger executables that log their calls
//! - [`git`]: git repositories with controllable committer history

pub mod fixture;
pub mod git;
pub mod tools;

pub use fixture::ApiFixture;
pub use tools::FakeTools;
