//! Discovery and display of the commits stacked on trunk.

use crate::git::{Branch, CommitHash, Git};
use anyhow::Result;
use glob::Pattern;
use log::warn;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;

/// One stacked commit.
#[derive(Debug, Clone, Serialize)]
pub struct StackEntry {
    pub hash: CommitHash,
    pub short: String,
    pub subject: String,
    /// Branches whose tip is this commit.
    pub branches: Vec<Branch>,
    /// Short id of the commit this entry sits on when it does not continue
    /// the previous entry, i.e. the stack forks here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forks_from: Option<String>,
}

/// The commit the stack is rooted on.
#[derive(Debug, Clone, Serialize)]
pub struct StackBase {
    pub hash: CommitHash,
    pub short: String,
    pub subject: String,
}

/// Shape of `trail stack --format json`.
#[derive(Debug, Serialize)]
pub struct StackView {
    pub base: StackBase,
    pub entries: Vec<StackEntry>,
}

/// Commits stacked on `base` that trunk does not know about, in
/// parents-before-children order.
pub fn discover<G: Git>(
    git: &G,
    base: &CommitHash,
    trunk_tip: &CommitHash,
    trunk: &Branch,
) -> Result<Vec<StackEntry>> {
    let mut heads: BTreeSet<Branch> = git.branches_containing(base)?.into_iter().collect();
    heads.remove(trunk);
    if heads.is_empty() {
        return Ok(Vec::new());
    }

    let heads: Vec<Branch> = heads.into_iter().collect();
    let commits = git.rev_list_with_parents(&heads, trunk_tip)?;

    let mut entries = Vec::with_capacity(commits.len());
    let mut last = base.clone();
    for (commit, parents) in commits {
        let anchor = parents.first().cloned().unwrap_or_else(|| base.clone());
        let forks_from = if anchor == last {
            None
        } else {
            Some(git.short_hash(&anchor)?)
        };
        entries.push(StackEntry {
            short: git.short_hash(&commit)?,
            subject: git.subject(&commit)?,
            branches: git.branches_pointing_at(&commit)?,
            forks_from,
            hash: commit.clone(),
        });
        last = commit;
    }
    Ok(entries)
}

/// Keep only entries whose commit touches a path matching one of
/// `patterns`. Commits whose changes cannot be read are dropped with a
/// warning.
pub fn filter_touching<G: Git>(
    git: &G,
    entries: Vec<StackEntry>,
    patterns: &[Pattern],
) -> Vec<StackEntry> {
    entries
        .into_par_iter()
        .filter(|entry| match git.changed_files(&entry.hash) {
            Ok(files) => files
                .iter()
                .any(|file| patterns.iter().any(|pattern| pattern.matches(file))),
            Err(e) => {
                warn!("Skipping {}: {e:#}", entry.short);
                false
            }
        })
        .collect()
}

/// Human-readable listing, one line per entry under a `base` header.
pub fn render_text(base: &StackBase, entries: &[StackEntry]) -> String {
    let mut out = format!("base {} {}\n", base.short, base.subject);
    for entry in entries {
        out.push_str(&format!("  {} {}", entry.short, entry.subject));
        if !entry.branches.is_empty() {
            let names: Vec<&str> = entry.branches.iter().map(Branch::as_str).collect();
            out.push_str(&format!("  [{}]", names.join(", ")));
        }
        if let Some(anchor) = &entry.forks_from {
            out.push_str(&format!("  (forks from {anchor})"));
        }
        out.push('\n');
    }
    out
}
