//! Porcelain-style rendering of git status flags

use git2::Status;

/// Two-character `XY` status code, as `git status --porcelain` prints it.
pub fn porcelain_code(status: Status) -> String {
    let index = if status.contains(Status::CONFLICTED) {
        'U'
    } else if status.contains(Status::INDEX_NEW) {
        'A'
    } else if status.contains(Status::INDEX_MODIFIED) {
        'M'
    } else if status.contains(Status::INDEX_DELETED) {
        'D'
    } else if status.contains(Status::INDEX_RENAMED) {
        'R'
    } else if status.contains(Status::INDEX_TYPECHANGE) {
        'T'
    } else if status.contains(Status::WT_NEW) {
        '?'
    } else {
        ' '
    };

    let worktree = if status.contains(Status::CONFLICTED) {
        'U'
    } else if status.contains(Status::WT_NEW) {
        '?'
    } else if status.contains(Status::WT_MODIFIED) {
        'M'
    } else if status.contains(Status::WT_DELETED) {
        'D'
    } else if status.contains(Status::WT_RENAMED) {
        'R'
    } else if status.contains(Status::WT_TYPECHANGE) {
        'T'
    } else {
        ' '
    };

    format!("{index}{worktree}")
}
