//! `trail restack`: evolve after the current branch has moved.

use super::evolve;
use crate::git::Git;
use anyhow::Result;
use log::debug;

/// Rebase the stack rooted at the previous HEAD position onto the current
/// one.
///
/// The defaults follow the reflog: after `git reset --hard upstream/main`
/// (or any branch move), `HEAD@{1}` is where the stack still sits and
/// `HEAD` is where it should go.
#[tracing::instrument(skip(git))]
pub fn restack<G: Git>(
    git: &G,
    onto: Option<&str>,
    base: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let onto = onto.unwrap_or("HEAD");
    let base = base.unwrap_or("HEAD@{1}");
    debug!("Restacking {base} onto {onto}");
    evolve::execute(git, onto, base, dry_run)
}
