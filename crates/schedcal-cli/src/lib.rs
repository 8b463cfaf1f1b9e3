//! CLI for generating calendar feeds from schedule pages
//!
//! This crate provides the `schedcal` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use error::{CliError, CliResult};
