pub mod commands;
pub mod formula;
pub mod git;
pub mod plan;
pub mod select;
pub mod stack;
