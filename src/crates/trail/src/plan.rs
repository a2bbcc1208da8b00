//! Rebase-todo generation for `trail evolve`.
//!
//! An evolve is an interactive rebase whose todo list trail writes itself.
//! The list replays every commit stacked on `base`, re-points the stack's
//! branches at the rewritten commits as it goes, and leaves the repository
//! on the same branch it started on.

use crate::git::{Branch, CommitHash, Git};
use anyhow::Result;
use std::collections::BTreeSet;
use std::fmt;

/// One line of a `git rebase -i` todo list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoCommand {
    /// `label <name>`: name the commit the rebase is currently at.
    Label(CommitHash),
    /// `pick <hash> <subject>`: replay a commit.
    Pick {
        commit: CommitHash,
        subject: String,
    },
    /// `reset <name>`: move to a label created earlier, or to the literal
    /// commit when no label of that name exists.
    Reset(CommitHash),
    /// `exec <cmd>`: run a shell command at this point of the rebase.
    Exec(String),
}

impl fmt::Display for TodoCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TodoCommand::Label(commit) => write!(f, "label {commit}"),
            TodoCommand::Pick { commit, subject } => write!(f, "pick {commit} {subject}"),
            TodoCommand::Reset(commit) => write!(f, "reset {commit}"),
            TodoCommand::Exec(cmd) => write!(f, "exec {cmd}"),
        }
    }
}

/// A complete rebase-todo script, one command per line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TodoList(Vec<TodoCommand>);

impl TodoList {
    pub fn commands(&self) -> &[TodoCommand] {
        &self.0
    }
}

impl From<Vec<TodoCommand>> for TodoList {
    fn from(commands: Vec<TodoCommand>) -> Self {
        TodoList(commands)
    }
}

impl fmt::Display for TodoList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, command) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{command}")?;
        }
        Ok(())
    }
}

/// Branches an evolve has to carry along: those containing `base`, minus
/// the ones already containing `exclude`.
///
/// The subtraction drops trunk-like branches. After a `git pull`, trunk
/// contains both the old stack base and the new tip; walking from it would
/// drag upstream commits into the plan.
pub fn downstream_heads<G: Git>(
    git: &G,
    base: &CommitHash,
    exclude: &CommitHash,
) -> Result<BTreeSet<Branch>> {
    let mut heads: BTreeSet<Branch> = git.branches_containing(base)?.into_iter().collect();
    let upstream: BTreeSet<Branch> = git.branches_containing(exclude)?.into_iter().collect();
    heads.retain(|branch| !upstream.contains(branch));
    Ok(heads)
}

/// Builds the todo list that moves everything stacked on `base` onto the
/// rebase target.
///
/// The list runs under `git rebase -i <onto>`, which checks out `onto`
/// before executing it. The leading label therefore names `base` but
/// points at `onto`, and every commit whose parent was `base` gets
/// replayed on top of the new position. Labels for picked commits are
/// named by their pre-rebase ids, so `reset` lines written against the
/// old history land on the rewritten commits.
#[derive(Debug)]
pub struct EvolvePlan<'a> {
    pub onto: &'a CommitHash,
    pub base: &'a CommitHash,
}

impl EvolvePlan<'_> {
    #[tracing::instrument(skip(git))]
    pub fn build<G: Git>(&self, git: &G) -> Result<TodoList> {
        let heads = downstream_heads(git, self.base, self.onto)?;

        let mut commands = vec![TodoCommand::Label(self.base.clone())];

        if !heads.is_empty() {
            let heads: Vec<Branch> = heads.into_iter().collect();
            let commits = git.rev_list_with_parents(&heads, self.base)?;

            let mut last_picked = self.base.clone();
            for (commit, parents) in commits {
                // Merge commits are anchored by their first parent.
                let anchor = parents
                    .first()
                    .cloned()
                    .unwrap_or_else(|| self.base.clone());
                if anchor != last_picked {
                    commands.push(TodoCommand::Reset(anchor));
                }
                commands.push(TodoCommand::Pick {
                    commit: commit.clone(),
                    subject: git.subject(&commit)?,
                });
                commands.push(TodoCommand::Label(commit.clone()));
                for branch in git.branches_pointing_at(&commit)? {
                    commands.push(TodoCommand::Exec(format!("git branch -f {branch}")));
                }
                last_picked = commit;
            }
        }

        // End where we started so the invoking branch is left unchanged.
        commands.push(TodoCommand::Reset(self.base.clone()));

        Ok(TodoList::from(commands))
    }
}
