//! `trail evolve`: replay a stack of branches during an interactive rebase.

use crate::git::Git;
use crate::plan::EvolvePlan;
use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

/// Write the rebase todo for moving everything stacked on `base` onto `onto`.
///
/// This doubles as git's sequence editor during [`execute`]: git invokes
/// the editor with the todo path appended as the final argument, and the
/// generated plan replaces the default todo list.
#[tracing::instrument(skip(git))]
pub fn plan<G: Git>(git: &G, onto: &str, base: &str, output: &Path) -> Result<()> {
    let onto = git.rev_parse(onto)?;
    let base = git.rev_parse(base)?;

    let todo = EvolvePlan {
        onto: &onto,
        base: &base,
    }
    .build(git)?;

    debug!("Writing rebase todo to {:?}", output);
    std::fs::write(output, todo.to_string())
        .with_context(|| format!("Failed to write rebase todo to {:?}", output))?;
    Ok(())
}

/// Run the interactive rebase that carries out an evolve.
///
/// With `dry_run` the todo list is printed instead of executed.
#[tracing::instrument(skip(git))]
pub fn execute<G: Git>(git: &G, onto: &str, base: &str, dry_run: bool) -> Result<()> {
    let onto = git.rev_parse(onto)?;
    let base = git.rev_parse(base)?;

    if dry_run {
        let todo = EvolvePlan {
            onto: &onto,
            base: &base,
        }
        .build(git)?;
        println!("{todo}");
        return Ok(());
    }

    let exe = std::env::current_exe().context("Failed to locate the trail binary")?;
    // Revisions are passed as resolved ids so the plan stays stable while
    // the rebase rewrites refs underneath it.
    let editor = format!("\"{}\" evolve plan {} {}", exe.display(), onto, base);
    debug!("GIT_SEQUENCE_EDITOR={editor}");
    git.rebase_interactive(&onto, &editor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockGit;
    use crate::test_utils::commit;
    use mockall::predicate::eq;
    use tempfile::tempdir;

    fn resolving(onto: u32, base: u32) -> MockGit {
        let mut git = MockGit::new();
        git.expect_rev_parse()
            .with(eq("onto-rev"))
            .returning(move |_| Ok(commit(onto)));
        git.expect_rev_parse()
            .with(eq("base-rev"))
            .returning(move |_| Ok(commit(base)));
        git
    }

    fn expect_empty_plan(git: &mut MockGit) {
        git.expect_branches_containing().returning(|_| Ok(vec![]));
    }

    #[test]
    fn test_plan_writes_todo_file() {
        let mut git = resolving(100, 1);
        expect_empty_plan(&mut git);

        let dir = tempdir().unwrap();
        let output = dir.path().join("todo");
        plan(&git, "onto-rev", "base-rev", &output).unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written, format!("label {}\nreset {}", commit(1), commit(1)));
    }

    #[test]
    fn test_plan_fails_on_unknown_revision() {
        let mut git = MockGit::new();
        git.expect_rev_parse()
            .returning(|spec| Err(anyhow::anyhow!("Failed to resolve revision '{spec}'")));

        let dir = tempdir().unwrap();
        let result = plan(&git, "nope", "base-rev", &dir.path().join("todo"));
        assert!(result.is_err());
    }

    #[test]
    fn test_execute_dry_run_skips_rebase() {
        let mut git = resolving(100, 1);
        expect_empty_plan(&mut git);
        git.expect_rebase_interactive().times(0);

        execute(&git, "onto-rev", "base-rev", true).unwrap();
    }

    #[test]
    fn test_execute_installs_self_as_sequence_editor() {
        let mut git = resolving(100, 1);
        git.expect_rebase_interactive()
            .withf(|onto, editor| {
                *onto == commit(100)
                    && editor.contains(" evolve plan ")
                    && editor.contains(&commit(100).to_string())
                    && editor.contains(&commit(1).to_string())
            })
            .return_once(|_, _| Ok(()));

        execute(&git, "onto-rev", "base-rev", false).unwrap();
    }
}
