//! Producing one destination file from its candidates

use std::path::Path;

use crate::candidates::{Candidate, CandidateKind};
use crate::tools::DefinitionTools;
use crate::{Error, Result};

/// Materialize `dst` from one or two candidates.
///
/// A single candidate is normalize-printed directly. An active candidate
/// paired with the internal next-major rendition is merged into a temporary
/// file first, and only that merge output is printed; in every other pairing
/// the active candidate is printed and the other one is dropped. The printer
/// runs exactly once per destination.
pub fn materialize(tools: &dyn DefinitionTools, dst: &Path, candidates: &[Candidate]) -> Result<()> {
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent).map_err(|e| protosync_fs::Error::io(parent, e))?;
    }

    match candidates {
        [single] => {
            tracing::info!(dst = %dst.display(), "proto_print");
            tools.print(&single.path, dst)
        }
        [first, second] => {
            let (active, shadow) = match (first.kind, second.kind) {
                (CandidateKind::ActiveOrFrozen, k) if k.is_next_major() => (first, second),
                (k, CandidateKind::ActiveOrFrozen) if k.is_next_major() => (second, first),
                _ => return Err(conflict(dst, candidates)),
            };

            if shadow.kind != CandidateKind::NextMajorInternal {
                tracing::info!(dst = %dst.display(), "proto_print");
                return tools.print(&active.path, dst);
            }

            let merged = tempfile::Builder::new()
                .prefix("protosync-merge-")
                .suffix(".proto")
                .tempfile()?
                .into_temp_path();
            tracing::info!(dst = %dst.display(), "merge_active_shadow");
            tools.merge(&active.path, &shadow.path, &merged)?;
            tracing::info!(dst = %dst.display(), "proto_print");
            tools.print(&merged, dst)
        }
        _ => Err(conflict(dst, candidates)),
    }
}

fn conflict(dst: &Path, candidates: &[Candidate]) -> Error {
    Error::CandidateConflict {
        destination: dst.to_path_buf(),
        candidates: candidates.iter().map(|c| c.path.clone()).collect(),
    }
}
