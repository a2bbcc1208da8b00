//! Interactive choice between candidates via the skim fuzzy finder.

use skim::prelude::*;
use std::io::Cursor;

/// Put `options` in front of the user and return the chosen line.
///
/// Returns `None` when the picker is cancelled or nothing is selected.
/// Needs a terminal; callers with a single candidate should not get here.
pub fn select_one(options: Vec<String>) -> Option<String> {
    let skim_options = SkimOptionsBuilder::default().build().ok()?;
    let items = SkimItemReader::default().of_bufread(Cursor::new(options.join("\n")));

    let output = Skim::run_with(&skim_options, Some(items))?;
    if output.is_abort {
        return None;
    }
    output
        .selected_items
        .first()
        .map(|item| item.output().to_string())
}
