//! `trail formula`: keep the Homebrew formula at the repo root current.

use crate::formula::{FORMULA_FILE, Formula};
use crate::git::Git;
use anyhow::{Context, Result, bail};
use std::fs;

#[tracing::instrument(skip(git))]
pub fn formula<G: Git>(git: &G, write: bool, check: bool) -> Result<()> {
    let rendered = Formula::trail().render();

    if !write && !check {
        print!("{rendered}");
        return Ok(());
    }

    let path = git.repo_root()?.join(FORMULA_FILE);
    if write {
        fs::write(&path, &rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let on_disk = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if on_disk != rendered {
        bail!(
            "{} is out of date; run `trail formula --write`",
            path.display()
        );
    }
    println!("{} is up to date", path.display());
    Ok(())
}
