//! The sync pass: Discover, Stage, Diff, then Report or Apply

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use protosync_fs::{StagingArea, copy_filtered, io, list_files};
use protosync_git::{NoSourceControl, SourceControl};
use rayon::prelude::*;

use super::confirm::{Confirm, FixedAnswer};
use super::diff::TreeDiff;
use super::outcome::{SyncMode, SyncOutcome};
use crate::candidates::{Candidate, CandidateKind, CandidateSet, Label, SyncGate};
use crate::deps::DependencyResolver;
use crate::manifest;
use crate::merger;
use crate::paths::PathResolver;
use crate::policy::NamespacePolicy;
use crate::tools::DefinitionTools;
use crate::{Error, Result};

/// Where to look when a deletion was not intended.
pub const STYLE_GUIDE_URL: &str =
    "https://github.com/envoyproxy/envoy/blob/main/api/STYLE.md#adding-an-extension-configuration-to-the-api";

static NO_SOURCE_CONTROL: NoSourceControl = NoSourceControl;
static DECLINE: FixedAnswer = FixedAnswer(false);

/// Inputs of one pass.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Live tree to compare against and, in fix mode, rewrite
    pub api_root: PathBuf,
    /// Build labels whose artifacts make up the proposed tree
    pub labels: Vec<String>,
    pub mode: SyncMode,
    /// Answer every confirmation with yes
    pub ci: bool,
    /// Use the internal next-major artifacts instead of the public ones
    pub shadow: bool,
}

/// Candidates found for a pass plus the destinations carried over unchanged.
#[derive(Debug, Default)]
struct Discovery {
    candidates: CandidateSet,
    carried_over: BTreeSet<PathBuf>,
}

/// Rebuilds an API tree from build artifacts and reconciles it with the live tree.
pub struct TreeSynchronizer<'a> {
    policy: &'a NamespacePolicy,
    tools: &'a dyn DefinitionTools,
    source_control: &'a dyn SourceControl,
    confirm: &'a dyn Confirm,
    artifact_root: PathBuf,
    history_root: Option<PathBuf>,
    tooling_paths: Vec<PathBuf>,
    force: bool,
    jobs: Option<usize>,
}

impl<'a> TreeSynchronizer<'a> {
    /// A synchronizer with no version control and a confirmation that
    /// always declines.
    pub fn new(
        policy: &'a NamespacePolicy,
        tools: &'a dyn DefinitionTools,
        artifact_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            policy,
            tools,
            source_control: &NO_SOURCE_CONTROL,
            confirm: &DECLINE,
            artifact_root: artifact_root.into(),
            history_root: None,
            tooling_paths: Vec::new(),
            force: false,
            jobs: None,
        }
    }

    pub fn with_source_control(mut self, source_control: &'a dyn SourceControl) -> Self {
        self.source_control = source_control;
        self
    }

    pub fn with_confirm(mut self, confirm: &'a dyn Confirm) -> Self {
        self.confirm = confirm;
        self
    }

    /// Tree whose modification history drives the skip gate. Defaults to
    /// the API root of each pass.
    pub fn with_history_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.history_root = Some(root.into());
        self
    }

    /// Paths whose modification forces every artifact to be regenerated.
    pub fn with_tooling_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.tooling_paths = paths;
        self
    }

    /// Regenerate every artifact regardless of history.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Worker threads for staging; `None` uses one per core.
    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Run one pass.
    ///
    /// Check mode never touches `request.api_root`. In fix mode the tree is
    /// rewritten only after both confirmation gates pass; a declined gate
    /// returns [`Error::Aborted`].
    pub fn run(&self, request: &SyncRequest) -> Result<SyncOutcome> {
        let api_root = &request.api_root;
        tracing::info!(
            api_root = %api_root.display(),
            mode = %request.mode,
            shadow = request.shadow,
            labels = request.labels.len(),
            "Starting sync pass"
        );

        let staging = StagingArea::new()?;
        let current = staging.current();
        let proposed = staging.proposed();

        let gate = self.sync_gate(api_root)?;
        let discovery = self.discover(request, &gate, &proposed)?;

        let tools = self.tools;
        let policy = self.policy;
        let candidates = &discovery.candidates;
        let staged = &proposed;
        self.in_pool(move || stage(tools, policy, candidates, staged))?;
        self.copy_manual_files(api_root, &proposed)?;

        copy_filtered(api_root, &current, &self.policy.current_tree_filter())?;

        let diff = TreeDiff::compute(&current, &proposed)?;
        let mut outcome = SyncOutcome::new(api_root.clone(), request.mode, request.shadow, &diff);
        outcome.synced = discovery.candidates.len();
        outcome.skipped = discovery.carried_over.len();

        match request.mode {
            SyncMode::Check => {
                if !diff.is_empty() {
                    tracing::warn!(
                        api_root = %api_root.display(),
                        changes = diff.changes().len(),
                        "API tree is out of date"
                    );
                }
            }
            SyncMode::Fix => {
                outcome.applied = self.apply(&diff, api_root, request.ci)?;
            }
        }

        Ok(outcome)
    }

    fn sync_gate(&self, api_root: &Path) -> Result<SyncGate> {
        if self.force {
            tracing::debug!("Sync forced; regenerating every artifact");
            return Ok(SyncGate::all());
        }

        let mut tooling_changed = false;
        for path in &self.tooling_paths {
            match self.source_control.modified_since_upstream(path, "")? {
                Some(files) if files.is_empty() => {}
                Some(files) => {
                    tracing::debug!(path = %path.display(), files = files.len(), "Tooling modified");
                    tooling_changed = true;
                    break;
                }
                None => {
                    tooling_changed = true;
                    break;
                }
            }
        }

        let history_root = self.history_root.as_deref().unwrap_or(api_root);
        let modified = self
            .source_control
            .modified_since_upstream(history_root, ".proto")?;
        Ok(SyncGate::from_history(tooling_changed, modified))
    }

    fn discover(&self, request: &SyncRequest, gate: &SyncGate, proposed: &Path) -> Result<Discovery> {
        let resolver = PathResolver::new(self.policy);
        let tracked = self.policy.current_tree_filter();
        let mut discovery = Discovery::default();

        for label in &request.labels {
            let label = Label::parse(label)?;
            for kind in CandidateKind::for_pass(request.shadow) {
                let relative = label.artifact(kind);
                let artifact = self.artifact_root.join(&relative);
                if !io::is_non_empty_file(&artifact) {
                    tracing::trace!(artifact = %artifact.display(), "No artifact");
                    continue;
                }

                let destination = resolver.resolve_file(&self.artifact_root, &relative)?;
                if !tracked.accepts(&forward_slashes(&destination)) {
                    return Err(Error::UntrackedDestination { destination });
                }

                if !gate.should_sync(&artifact) {
                    let existing = request.api_root.join(&destination);
                    if existing.is_file() {
                        tracing::info!(path = %artifact.display(), "Skipping sync");
                        io::copy_file(&existing, &proposed.join(&destination))?;
                        discovery.carried_over.insert(destination);
                        continue;
                    }
                    tracing::debug!(
                        destination = %destination.display(),
                        "Nothing to carry over; regenerating"
                    );
                }

                discovery
                    .candidates
                    .insert(destination, Candidate::new(artifact, kind))?;
            }
        }

        tracing::debug!(
            destinations = discovery.candidates.len(),
            carried_over = discovery.carried_over.len(),
            "Discovery complete"
        );
        Ok(discovery)
    }

    fn in_pool<R, F>(&self, op: F) -> Result<R>
    where
        R: Send,
        F: FnOnce() -> Result<R> + Send,
    {
        match self.jobs {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| Error::WorkerPool {
                    message: e.to_string(),
                })?
                .install(op),
            None => op(),
        }
    }

    fn copy_manual_files(&self, api_root: &Path, proposed: &Path) -> Result<()> {
        for file in &self.policy.manual_files {
            let src = api_root.join(file);
            if !src.is_file() {
                tracing::warn!(path = %src.display(), "Manually maintained file is missing");
                continue;
            }
            io::copy_file(&src, &proposed.join(file))?;
        }
        Ok(())
    }

    fn apply(&self, diff: &TreeDiff, api_root: &Path, ci: bool) -> Result<bool> {
        if diff.is_empty() {
            tracing::info!(api_root = %api_root.display(), "API tree is up to date");
            return Ok(false);
        }

        let dirty = self.source_control.dirty_entries(api_root)?;
        if !dirty.is_empty() {
            let question = format!(
                "git status indicates a dirty API tree:\n{}\n\
                 Proto formatting may overwrite or delete files in the above list with no git backup.\n\
                 Continue?",
                dirty.join("\n")
            );
            self.confirm_or_abort(&question, ci, "API tree has uncommitted changes")?;
        }

        let deleted = diff.deletions();
        if !deleted.is_empty() {
            let question = format!(
                "The following files will be deleted:\n  {}\n\
                 If this is not intended, please see {STYLE_GUIDE_URL}.\n\
                 Delete files?",
                deleted.join("\n  ")
            );
            self.confirm_or_abort(&question, ci, "file deletion was not confirmed")?;
        }

        diff.apply(api_root)?;
        tracing::info!(
            api_root = %api_root.display(),
            changes = diff.changes().len(),
            "Applied changes"
        );
        Ok(true)
    }

    fn confirm_or_abort(&self, question: &str, ci: bool, reason: &str) -> Result<()> {
        if ci {
            tracing::warn!("{question} yes (CI)");
            return Ok(());
        }
        if self.confirm.confirm(question) {
            Ok(())
        } else {
            Err(Error::aborted(reason))
        }
    }
}

/// Materialize every destination, then write a manifest for every directory
/// holding definition files.
fn stage(
    tools: &dyn DefinitionTools,
    policy: &NamespacePolicy,
    candidates: &CandidateSet,
    proposed: &Path,
) -> Result<()> {
    let units: Vec<(&PathBuf, &[Candidate])> = candidates.iter().collect();
    units
        .par_iter()
        .try_for_each(|(destination, candidates)| {
            merger::materialize(tools, &proposed.join(destination), candidates)
        })?;

    let resolver = DependencyResolver::new(policy);
    let directories = proto_directories(proposed)?;
    directories
        .par_iter()
        .try_for_each(|directory| manifest::write_directory_manifest(&resolver, proposed, directory))?;

    tracing::debug!(
        destinations = units.len(),
        manifests = directories.len(),
        "Staged proposed tree"
    );
    Ok(())
}

fn forward_slashes(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Tree-relative directories directly containing at least one `.proto` file.
fn proto_directories(root: &Path) -> Result<Vec<String>> {
    let directories: HashSet<String> = list_files(root)?
        .into_iter()
        .filter(|f| f.ends_with(".proto"))
        .map(|f| f.rsplit_once('/').map(|(dir, _)| dir.to_string()).unwrap_or_default())
        .collect();
    let mut directories: Vec<String> = directories.into_iter().collect();
    directories.sort();
    Ok(directories)
}
