//! Tree synchronization
//!
//! A pass moves through four states:
//!
//! 1. **Discover**: map labels to candidate artifacts, resolve each to its
//!    destination path and decide whether it is regenerated or carried over.
//! 2. **Stage**: materialize destinations and manifests into a scratch
//!    "proposed" tree, next to a filtered copy of the live tree.
//! 3. **Diff**: compare the two trees file by file.
//! 4. **Report** the diff (check mode) or **Apply** it after confirmation
//!    (fix mode).

pub mod confirm;
pub mod diff;
pub mod engine;
pub mod outcome;

pub use confirm::{Confirm, FixedAnswer};
pub use diff::{ChangeKind, FileChange, TreeDiff};
pub use engine::{STYLE_GUIDE_URL, SyncRequest, TreeSynchronizer};
pub use outcome::{SyncMode, SyncOutcome};
