//! CLI module - argument parsing and run orchestration

mod args;
mod run;

pub use args::{Cli, Commands};
pub use run::run;
