//! Error types for the plan-assertion engine.
//!
//! Three families of failure are kept apart on purpose:
//!
//! - [`ConfigError`]: a precondition failed before any external tool ran.
//! - [`ToolError`]: an external tool step exited abnormally or produced
//!   output that could not be parsed.
//! - [`AssertionFailure`]: the plan was generated fine but does not look
//!   the way the caller expected.
//!
//! None of them is retried automatically.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for plancheck.
#[derive(Debug, Error)]
pub enum PlanCheckError {
    /// Configuration and precondition errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// External tool errors.
    #[error("External tool error: {0}")]
    Tool(#[from] ToolError),

    /// The plan did not satisfy one or more expectations.
    #[error("Assertion failed: {0}")]
    Assertion(#[from] AssertionFailure),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Precondition failures detected before invoking external tools.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The source directory holds no recognized declarative source files.
    #[error("No source files found: no *.{extension} files in {}", .dir.display())]
    NoSourceFiles {
        /// Directory that was scanned.
        dir: PathBuf,
        /// Extension that was looked for.
        extension: String,
    },

    /// The source directory does not exist or is not a directory.
    #[error("Source directory not found: {}", .path.display())]
    SourceDirNotFound {
        /// Path that was given.
        path: PathBuf,
    },

    /// The configuration file was not found.
    #[error("Configuration file not found: {}", .path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// An attribute path could not be parsed.
    #[error("Invalid attribute path '{path}': {reason}")]
    InvalidPath {
        /// The path as written.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The requested built-in expectation preset does not exist.
    #[error("Unknown preset: {name}")]
    UnknownPreset {
        /// Requested preset name.
        name: String,
    },
}

/// Failures of an external tool step.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The step ran but exited with a non-zero status.
    #[error("step '{step}' failed (exit code {}): {diagnostics}", describe_exit(.exit_code.as_ref()))]
    StepFailed {
        /// Name of the failing step.
        step: String,
        /// Exit code, `None` if terminated by a signal.
        exit_code: Option<i32>,
        /// Captured diagnostic output.
        diagnostics: String,
    },

    /// The step could not be started at all.
    #[error("step '{step}' could not be started: {message}")]
    SpawnFailed {
        /// Name of the failing step.
        step: String,
        /// Description of the spawn failure.
        message: String,
    },

    /// The step succeeded but its output is not in the expected format.
    #[error("step '{step}' produced invalid output: {message}")]
    InvalidOutput {
        /// Name of the step whose output was rejected.
        step: String,
        /// Description of the parse failure.
        message: String,
    },

    /// Plan generation exceeded the caller's time bound.
    #[error("plan generation did not finish within {secs} seconds")]
    Timeout {
        /// The bound that was exceeded.
        secs: u64,
    },
}

/// One or more expectations did not hold for the generated plan.
#[derive(Debug, Error)]
#[error("{} of {total} checks failed: {}", .failures.len(), .failures.join("; "))]
pub struct AssertionFailure {
    /// Description of each failed check.
    pub failures: Vec<String>,
    /// Total number of checks evaluated.
    pub total: usize,
}

fn describe_exit(code: Option<&i32>) -> String {
    code.map_or_else(|| String::from("none"), |c| c.to_string())
}

/// Result type alias for plancheck operations.
pub type Result<T> = std::result::Result<T, PlanCheckError>;

impl PlanCheckError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error is retryable.
    ///
    /// Always false: a failed plan run may leave partial working state
    /// behind, so the caller decides whether to start over.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }

    /// Returns the name of the failing tool step, if this is a tool error.
    #[must_use]
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            Self::Tool(
                ToolError::StepFailed { step, .. }
                | ToolError::SpawnFailed { step, .. }
                | ToolError::InvalidOutput { step, .. },
            ) => Some(step),
            _ => None,
        }
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates an invalid path error.
    #[must_use]
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl ToolError {
    /// Creates an invalid output error for a step.
    #[must_use]
    pub fn invalid_output(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOutput {
            step: step.into(),
            message: message.into(),
        }
    }
}
