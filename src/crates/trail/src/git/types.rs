//! Value types shared across the git layer.

use anyhow::{Error, bail};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Full object id of a commit, as printed by `git rev-parse`.
///
/// Only full-length ids are accepted: plans and labels built from these
/// must survive a rebase, and abbreviations can stop being unique.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CommitHash(String);

impl CommitHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CommitHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // 40 for SHA-1 repositories, 64 for SHA-256 ones.
        if !matches!(s.len(), 40 | 64) || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("Not a full commit id: '{s}'");
        }
        Ok(CommitHash(s.to_ascii_lowercase()))
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Short name of a local branch, with `refs/heads/` stripped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Branch(String);

impl Branch {
    pub fn new(name: impl Into<String>) -> Self {
        Branch(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
