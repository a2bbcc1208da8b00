//! Implementations of the CLI subcommands.

pub mod evolve;
mod formula;
mod prior;
mod restack;
mod stack;

pub use formula::formula;
pub use prior::prior;
pub use restack::restack;
pub use stack::{OutputFormat, stack};
