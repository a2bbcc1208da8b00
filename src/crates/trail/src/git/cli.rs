//! [`Git`] implemented over the `git` binary.

use super::{Branch, CommitHash, Git};
use anyhow::{Context, Result};
use log::trace;
use std::path::PathBuf;

/// Runs git as a subprocess.
///
/// Commands execute in the process working directory by default;
/// [`CliGit::in_dir`] pins them to a specific repository instead, which is
/// how the test suite drives throwaway repositories.
#[derive(Debug, Clone, Default)]
pub struct CliGit {
    dir: Option<PathBuf>,
}

impl CliGit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    fn git<I, S>(&self, args: I) -> duct::Expression
    where
        I: IntoIterator<Item = S>,
        S: Into<std::ffi::OsString>,
    {
        let expr = duct::cmd("git", args);
        match &self.dir {
            Some(dir) => expr.dir(dir),
            None => expr,
        }
    }
}

/// `git branch --format %(refname:short)` output, minus the pseudo entries
/// git emits for detached or rebasing HEADs ("(HEAD detached at ...)").
fn parse_branch_lines(out: &str) -> Vec<Branch> {
    out.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('('))
        .map(Branch::new)
        .collect()
}

impl Git for CliGit {
    fn rev_parse(&self, spec: &str) -> Result<CommitHash> {
        trace!("rev_parse {spec}");
        let peeled = format!("{spec}^{{commit}}");
        let out = self
            .git(["rev-parse", "--verify", "--end-of-options", peeled.as_str()])
            .stderr_null()
            .read()
            .with_context(|| format!("Failed to resolve revision '{spec}'"))?;
        out.parse()
    }

    fn short_hash(&self, commit: &CommitHash) -> Result<String> {
        let out = self
            .git(["rev-parse", "--short", commit.as_str()])
            .read()
            .with_context(|| format!("Failed to abbreviate {commit}"))?;
        Ok(out.trim().to_string())
    }

    fn subject(&self, commit: &CommitHash) -> Result<String> {
        let out = self
            .git(["log", "-n", "1", "--format=%s", commit.as_str()])
            .read()
            .with_context(|| format!("Failed to read the subject of {commit}"))?;
        Ok(out.trim().to_string())
    }

    fn branches_pointing_at(&self, commit: &CommitHash) -> Result<Vec<Branch>> {
        trace!("branches_pointing_at {commit}");
        let out = self
            .git([
                "branch",
                "--points-at",
                commit.as_str(),
                "--format",
                "%(refname:short)",
            ])
            .read()
            .with_context(|| format!("Failed to list branches at {commit}"))?;
        Ok(parse_branch_lines(&out))
    }

    fn branches_containing(&self, commit: &CommitHash) -> Result<Vec<Branch>> {
        trace!("branches_containing {commit}");
        let out = self
            .git([
                "branch",
                "--contains",
                commit.as_str(),
                "--format",
                "%(refname:short)",
            ])
            .read()
            .with_context(|| format!("Failed to list branches containing {commit}"))?;
        Ok(parse_branch_lines(&out))
    }

    fn local_branch_tips(&self) -> Result<Vec<(Branch, CommitHash)>> {
        let out = self
            .git([
                "for-each-ref",
                "--format=%(refname:short) %(objectname)",
                "refs/heads",
            ])
            .read()
            .context("Failed to list local branches")?;
        let mut tips = Vec::new();
        for line in out.lines() {
            let mut fields = line.split_whitespace();
            if let (Some(name), Some(hash)) = (fields.next(), fields.next()) {
                tips.push((Branch::new(name), hash.parse()?));
            }
        }
        Ok(tips)
    }

    fn rev_list_with_parents(
        &self,
        heads: &[Branch],
        exclude: &CommitHash,
    ) -> Result<Vec<(CommitHash, Vec<CommitHash>)>> {
        trace!("rev_list_with_parents {heads:?} ^{exclude}");
        let mut args: Vec<String> = ["rev-list", "--reverse", "--topo-order", "--parents"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.extend(heads.iter().map(|head| head.as_str().to_string()));
        args.push(format!("^{exclude}"));

        let out = self
            .git(args)
            .read()
            .context("Failed to enumerate stacked commits")?;

        let mut commits = Vec::new();
        for line in out.lines() {
            let mut fields = line.split_whitespace();
            let Some(commit) = fields.next() else {
                continue;
            };
            let parents = fields
                .map(str::parse)
                .collect::<Result<Vec<CommitHash>>>()?;
            commits.push((commit.parse()?, parents));
        }
        Ok(commits)
    }

    fn rev_list_first_parent(&self, from: &CommitHash, limit: usize) -> Result<Vec<CommitHash>> {
        let args = vec![
            "rev-list".to_string(),
            "--first-parent".to_string(),
            format!("--max-count={limit}"),
            from.to_string(),
        ];
        let out = self
            .git(args)
            .read()
            .with_context(|| format!("Failed to walk history from {from}"))?;
        out.lines().map(str::parse).collect()
    }

    fn merge_base(&self, a: &CommitHash, b: &CommitHash) -> Result<CommitHash> {
        let out = self
            .git(["merge-base", a.as_str(), b.as_str()])
            .read()
            .with_context(|| format!("No merge base between {a} and {b}"))?;
        out.parse()
    }

    fn changed_files(&self, commit: &CommitHash) -> Result<Vec<String>> {
        trace!("changed_files {commit}");
        let out = self
            .git([
                "diff-tree",
                "--no-commit-id",
                "--name-only",
                "-r",
                "--root",
                commit.as_str(),
            ])
            .read()
            .with_context(|| format!("Failed to list files changed by {commit}"))?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    fn current_branch(&self) -> Result<Option<Branch>> {
        // Exits non-zero with no output when HEAD is detached.
        let out = self
            .git(["symbolic-ref", "--quiet", "--short", "HEAD"])
            .unchecked()
            .stderr_null()
            .read()
            .context("Failed to read HEAD")?;
        let name = out.trim();
        Ok(if name.is_empty() {
            None
        } else {
            Some(Branch::new(name))
        })
    }

    fn checkout(&self, rev: &str) -> Result<()> {
        self.git(["checkout", rev])
            .run()
            .with_context(|| format!("Failed to check out '{rev}'"))?;
        Ok(())
    }

    fn repo_root(&self) -> Result<PathBuf> {
        let out = self
            .git(["rev-parse", "--show-toplevel"])
            .read()
            .context("Not inside a git repository")?;
        Ok(PathBuf::from(out.trim()))
    }

    fn rebase_interactive(&self, onto: &CommitHash, sequence_editor: &str) -> Result<()> {
        trace!("rebase_interactive onto {onto}");
        self.git(["rebase", "-i", onto.as_str()])
            .env("GIT_SEQUENCE_EDITOR", sequence_editor)
            .run()
            .context("Rebase failed")?;
        Ok(())
    }
}
