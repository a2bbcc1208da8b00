//! `trail prior`: jump back to an earlier branch in the stack.

use crate::git::{Branch, Git};
use crate::select::select_one;
use anyhow::{Context, Result, bail};
use log::debug;
use std::collections::HashMap;

/// How far down the first-parent history to look for branches.
const MAX_WALK: usize = 1000;

/// Branches strictly below HEAD along its first-parent history, nearest
/// first. The branch HEAD is on never qualifies.
pub(crate) fn prior_branches<G: Git>(git: &G) -> Result<Vec<Branch>> {
    let head = git.rev_parse("HEAD")?;
    let current = git.current_branch()?;

    let mut tips: HashMap<_, Vec<Branch>> = HashMap::new();
    for (branch, commit) in git.local_branch_tips()? {
        if Some(&branch) != current.as_ref() {
            tips.entry(commit).or_default().push(branch);
        }
    }

    let mut found = Vec::new();
    for commit in git.rev_list_first_parent(&head, MAX_WALK)?.into_iter().skip(1) {
        if let Some(mut branches) = tips.remove(&commit) {
            branches.sort();
            found.extend(branches);
        }
    }
    Ok(found)
}

/// Check out the nearest prior branch, asking via the fuzzy finder when
/// several are equally plausible.
#[tracing::instrument(skip(git))]
pub fn prior<G: Git>(git: &G, list: bool, dry_run: bool) -> Result<()> {
    let mut found = prior_branches(git)?;
    debug!("Found {} prior branch(es)", found.len());

    if list {
        for branch in &found {
            println!("{branch}");
        }
        return Ok(());
    }

    let target = match found.len() {
        0 => bail!("No prior branch within {MAX_WALK} commits of HEAD"),
        1 => found.remove(0),
        _ => {
            let names = found.iter().map(Branch::to_string).collect();
            let picked = select_one(names).context("Selection cancelled")?;
            Branch::new(picked)
        }
    };

    if dry_run {
        println!("Would check out {target}");
        return Ok(());
    }
    git.checkout(target.as_str())
}
