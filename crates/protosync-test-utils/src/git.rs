//! Git repository fixtures built with `git2`.

use std::path::Path;

use git2::{IndexAddOption, Oid, Repository, Signature};

/// Committer address recognised as an upstream merge.
pub const UPSTREAM_EMAIL: &str = "noreply@github.com";

/// Initialise a real repository at `path` with no commits.
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn init_repo(path: &Path) -> Repository {
    Repository::init(path)
        .unwrap_or_else(|e| panic!("init_repo: failed to init repository at {}: {e}", path.display()))
}

/// Stage everything in the working tree and commit it as `email`.
///
/// # Panics
/// Panics if any git operation fails.
pub fn commit_all(repo: &Repository, message: &str, email: &str) -> Oid {
    let mut index = repo.index().unwrap();
    index.add_all(["*"], IndexAddOption::DEFAULT, None).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let signature = Signature::now("Test User", email).unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .unwrap_or_else(|e| panic!("commit_all: failed to commit: {e}"))
}

/// Commit everything as if merged upstream.
pub fn commit_upstream(repo: &Repository, message: &str) -> Oid {
    commit_all(repo, message, UPSTREAM_EMAIL)
}
