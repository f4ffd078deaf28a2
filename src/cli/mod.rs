//! Command-line interface module.

mod args;
pub mod build;
pub mod manifest;
pub mod scan;

pub use args::{Cli, Commands};
