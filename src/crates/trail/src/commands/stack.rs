//! `trail stack`: show the branches stacked above the trunk.

use crate::git::{Branch, CommitHash, Git};
use crate::stack::{StackBase, StackView, discover, filter_touching, render_text};
use anyhow::{Context, Result, bail};
use glob::Pattern;
use log::debug;

const TRUNK_CANDIDATES: [&str; 2] = ["main", "master"];

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

fn resolve_trunk<G: Git>(git: &G) -> Result<(Branch, CommitHash)> {
    for name in TRUNK_CANDIDATES {
        if let Ok(tip) = git.rev_parse(name) {
            return Ok((Branch::new(name), tip));
        }
    }
    bail!("No trunk branch found (tried 'main' and 'master')")
}

#[tracing::instrument(skip(git))]
pub fn stack<G: Git>(
    git: &G,
    base: Option<&str>,
    touching: &[String],
    format: OutputFormat,
) -> Result<()> {
    let patterns = touching
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("Invalid path pattern '{p}'")))
        .collect::<Result<Vec<_>>>()?;

    let (trunk, trunk_tip) = resolve_trunk(git)?;
    let base = match base {
        Some(spec) => git.rev_parse(spec)?,
        None => {
            let head = git.rev_parse("HEAD")?;
            git.merge_base(&head, &trunk_tip)?
        }
    };
    debug!("Stack base {base}, trunk {trunk}");

    let mut entries = discover(git, &base, &trunk_tip, &trunk)?;
    if !patterns.is_empty() {
        entries = filter_touching(git, entries, &patterns);
    }

    let base_info = StackBase {
        short: git.short_hash(&base)?,
        subject: git.subject(&base)?,
        hash: base,
    };

    match format {
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("Nothing stacked on {}.", base_info.short);
            } else {
                print!("{}", render_text(&base_info, &entries));
            }
        }
        OutputFormat::Json => {
            let view = StackView { base: base_info, entries };
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }
    Ok(())
}
