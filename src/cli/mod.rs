//! CLI module for plancheck.
//!
//! This module provides the command-line interface for generating plans
//! and checking them against a suite of expectations.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
