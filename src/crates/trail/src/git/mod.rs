//! Git plumbing used by trail.
//!
//! Everything that talks to a repository goes through the [`Git`] trait so
//! command logic can be exercised against a mock. [`CliGit`] is the real
//! implementation and shells out to the `git` binary.

mod cli;
mod types;

use anyhow::Result;
use std::path::PathBuf;

pub use cli::CliGit;
pub use types::{Branch, CommitHash};

#[cfg_attr(test, mockall::automock)]
pub trait Git: Send + Sync {
    /// Resolve a revision spec (branch name, hash, `HEAD@{1}`, ...) to a commit.
    fn rev_parse(&self, spec: &str) -> Result<CommitHash>;

    /// Unique abbreviation of a commit id, as `git rev-parse --short`.
    fn short_hash(&self, commit: &CommitHash) -> Result<String>;

    /// First line of the commit message.
    fn subject(&self, commit: &CommitHash) -> Result<String>;

    /// Local branches whose tip is exactly `commit`.
    fn branches_pointing_at(&self, commit: &CommitHash) -> Result<Vec<Branch>>;

    /// Local branches whose history contains `commit`.
    fn branches_containing(&self, commit: &CommitHash) -> Result<Vec<Branch>>;

    /// Every local branch together with the commit it points at.
    fn local_branch_tips(&self) -> Result<Vec<(Branch, CommitHash)>>;

    /// Commits reachable from `heads` but not from `exclude`, in
    /// parents-before-children order. Each entry carries the commit's
    /// parent ids.
    fn rev_list_with_parents(
        &self,
        heads: &[Branch],
        exclude: &CommitHash,
    ) -> Result<Vec<(CommitHash, Vec<CommitHash>)>>;

    /// First-parent history starting at `from`, newest first, at most
    /// `limit` entries (including `from` itself).
    fn rev_list_first_parent(&self, from: &CommitHash, limit: usize) -> Result<Vec<CommitHash>>;

    fn merge_base(&self, a: &CommitHash, b: &CommitHash) -> Result<CommitHash>;

    /// Paths touched by `commit`, relative to the repository root.
    fn changed_files(&self, commit: &CommitHash) -> Result<Vec<String>>;

    /// The checked-out branch, or `None` when HEAD is detached.
    fn current_branch(&self) -> Result<Option<Branch>>;

    fn checkout(&self, rev: &str) -> Result<()>;

    fn repo_root(&self) -> Result<PathBuf>;

    /// Run `git rebase -i <onto>` with `sequence_editor` installed as
    /// GIT_SEQUENCE_EDITOR, inheriting the terminal.
    fn rebase_interactive(&self, onto: &CommitHash, sequence_editor: &str) -> Result<()>;
}
