//! libgit2-backed source control

use std::path::{Path, PathBuf};

use git2::{DiffOptions, ErrorCode, Repository, StatusOptions};

use crate::provider::SourceControl;
use crate::status::porcelain_code;
use crate::{Error, Result};

/// Committer address GitHub uses for commits it creates when merging.
pub const UPSTREAM_MERGE_COMMITTER: &str = "noreply@github.com";

/// Source control backed by a git repository.
pub struct GitSourceControl {
    repo: Repository,
    workdir: PathBuf,
}

impl GitSourceControl {
    /// Open the repository containing `path`.
    ///
    /// Returns `Ok(None)` when `path` is not inside a git repository.
    pub fn discover(path: &Path) -> Result<Option<Self>> {
        let repo = match Repository::discover(path) {
            Ok(repo) => repo,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let workdir = repo
            .workdir()
            .ok_or_else(|| Error::BareRepository {
                path: path.to_path_buf(),
            })?
            .to_path_buf();
        let workdir = canonical(&workdir)?;
        Ok(Some(Self { repo, workdir }))
    }

    /// Working directory of the repository.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Repository-relative, forward-slash form of `path`, or `None` when it lies outside.
    fn relative(&self, path: &Path) -> Result<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }
        let path = canonical(path)?;
        Ok(path.strip_prefix(&self.workdir).ok().map(|rel| {
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        }))
    }

    /// The most recent commit reachable from HEAD that was created by an
    /// upstream merge, falling back to HEAD itself.
    fn upstream_base(&self) -> Result<Option<git2::Commit<'_>>> {
        let head = match self.repo.head() {
            Ok(head) => head.peel_to_commit()?,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let mut walk = self.repo.revwalk()?;
        walk.push(head.id())?;
        for oid in walk {
            let commit = self.repo.find_commit(oid?)?;
            if commit.committer().email() == Some(UPSTREAM_MERGE_COMMITTER) {
                tracing::debug!(commit = %commit.id(), "Found upstream merge commit");
                return Ok(Some(commit));
            }
        }

        tracing::debug!("No upstream merge commit found; comparing against HEAD");
        Ok(Some(head))
    }
}

impl SourceControl for GitSourceControl {
    fn dirty_entries(&self, path: &Path) -> Result<Vec<String>> {
        let Some(prefix) = self.relative(path)? else {
            return Ok(Vec::new());
        };

        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        let entries = statuses
            .iter()
            .filter_map(|entry| {
                let file = entry.path()?.to_string();
                is_within(&file, &prefix).then(|| format!("{} {}", porcelain_code(entry.status()), file))
            })
            .collect();
        Ok(entries)
    }

    fn modified_since_upstream(&self, path: &Path, suffix: &str) -> Result<Option<Vec<String>>> {
        let Some(prefix) = self.relative(path)? else {
            return Ok(Some(Vec::new()));
        };

        let base = self.upstream_base()?;
        let tree = match &base {
            Some(commit) => Some(commit.tree()?),
            None => None,
        };

        let mut opts = DiffOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);
        let diff = self
            .repo
            .diff_tree_to_workdir_with_index(tree.as_ref(), Some(&mut opts))?;

        let mut files: Vec<String> = diff
            .deltas()
            .filter_map(|delta| {
                let path = delta.new_file().path().or_else(|| delta.old_file().path())?;
                let path = path.to_string_lossy().replace('\\', "/");
                (is_within(&path, &prefix) && path.ends_with(suffix)).then_some(path)
            })
            .collect();
        files.sort();
        files.dedup();
        Ok(Some(files))
    }
}

fn is_within(path: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn canonical(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
