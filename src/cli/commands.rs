//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// plancheck - generate an infrastructure plan and assert on its contents.
#[derive(Parser, Debug)]
#[command(name = "plancheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the check-suite file.
    #[arg(short, long, global = true, env = "PLANCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter check-suite file.
    Init {
        /// Directory to initialize (defaults to current directory).
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Force overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the check-suite configuration.
    Validate {
        /// Show all warnings, not just errors.
        #[arg(short, long)]
        warnings: bool,
    },

    /// Generate the plan and list its resource changes.
    Plan {
        /// Source directory (overrides the configuration).
        #[arg(short, long)]
        source: Option<PathBuf>,
    },

    /// Generate the plan and check it against the expectations.
    Check {
        /// Source directory (overrides the configuration).
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Built-in expectation preset (overrides the configured preset).
        #[arg(long)]
        preset: Option<String>,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}
