//! CLI command implementations.

pub mod run;

pub use run::{print_outcome, run_review, RunOptions};
