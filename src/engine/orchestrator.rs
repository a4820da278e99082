//! Plan generation and query helpers.
//!
//! [`PlanAssertionEngine::generate_plan`] runs the external tool's
//! `init` → `plan` → `show -json` cycle against a source directory and
//! parses the result into a [`ChangeGraph`]. Each step must exit cleanly
//! before the next one starts, since each consumes the previous step's
//! on-disk artifact.
//!
//! The engine takes no lock of its own and disables the tool's state
//! locking, so callers must not run two plans against the same directory
//! at once. [`PlanAssertionEngine::generate_plan`] sets no timeout; use
//! [`PlanAssertionEngine::generate_plan_within`] to bound it. Child
//! processes are killed when the future is dropped.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::assertion::{AssertionEvaluator, CheckReport, Expectation};
use crate::config::ToolConfig;
use crate::error::{ConfigError, Result, ToolError};
use crate::plan::{AttributePath, ChangeGraph, PlanValue, ResourceChange};

use super::runner::{PlanStep, ProcessRunner, ToolInvocation, ToolOutput, ToolRunner};

/// Drives the external tool and exposes queries over its plan.
#[derive(Debug)]
pub struct PlanAssertionEngine<R = ProcessRunner> {
    /// Tool settings.
    tool: ToolConfig,
    /// Command runner.
    runner: R,
}

/// Removes the plan artifact when the run ends, however it ends. Armed
/// only once the `plan` step is about to write it.
#[derive(Debug)]
struct PlanArtifact {
    path: PathBuf,
    keep: bool,
}

impl Drop for PlanArtifact {
    fn drop(&mut self) {
        if self.keep || !self.path.exists() {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed plan artifact: {}", self.path.display()),
            Err(e) => warn!("Failed to remove plan artifact {}: {e}", self.path.display()),
        }
    }
}

impl PlanAssertionEngine<ProcessRunner> {
    /// Creates an engine that spawns real processes.
    #[must_use]
    pub const fn new(tool: ToolConfig) -> Self {
        Self {
            tool,
            runner: ProcessRunner,
        }
    }
}

impl<R: ToolRunner> PlanAssertionEngine<R> {
    /// Creates an engine with a custom runner.
    #[must_use]
    pub const fn with_runner(tool: ToolConfig, runner: R) -> Self {
        Self { tool, runner }
    }

    /// Returns the tool settings.
    #[must_use]
    pub const fn tool(&self) -> &ToolConfig {
        &self.tool
    }

    /// Counts the recognized source files directly inside `source_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist or cannot be read.
    pub fn count_source_files(&self, source_dir: &Path) -> Result<usize> {
        if !source_dir.is_dir() {
            return Err(ConfigError::SourceDirNotFound {
                path: source_dir.to_path_buf(),
            }
            .into());
        }

        let mut count = 0;
        for entry in std::fs::read_dir(source_dir)? {
            let path = entry?.path();
            if path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == self.tool.source_extension.as_str())
            {
                count += 1;
            }
        }

        Ok(count)
    }

    /// Runs the plan cycle and parses the rendered plan.
    ///
    /// Fails fast, before spawning anything, if `source_dir` holds no
    /// source files. Any step that cannot start, exits non-zero, or (for
    /// `show`) prints something other than a plan export fails the whole
    /// run. Nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a missing or empty source
    /// directory, and a tool error naming the failing step otherwise.
    pub async fn generate_plan(&self, source_dir: &Path) -> Result<ChangeGraph> {
        let sources = self.count_source_files(source_dir)?;
        if sources == 0 {
            return Err(ConfigError::NoSourceFiles {
                dir: source_dir.to_path_buf(),
                extension: self.tool.source_extension.clone(),
            }
            .into());
        }

        info!(
            "Generating plan for {} ({} source file(s)) with '{}'",
            source_dir.display(),
            sources,
            self.tool.binary
        );

        self.run_step(PlanStep::Init, source_dir).await?;

        let _artifact = PlanArtifact {
            path: source_dir.join(&self.tool.plan_file),
            keep: self.tool.keep_plan,
        };
        self.run_step(PlanStep::Plan, source_dir).await?;
        let rendered = self.run_step(PlanStep::Show, source_dir).await?;

        let graph = ChangeGraph::from_json_str(&rendered.stdout)
            .map_err(|e| ToolError::invalid_output(PlanStep::Show.as_str(), e.to_string()))?;

        info!(
            "Plan lists {} resource change(s) across {} type(s)",
            graph.len(),
            graph.resource_types().len()
        );

        Ok(graph)
    }

    /// Runs [`Self::generate_plan`] under a time bound.
    ///
    /// When the bound expires the in-flight step's child process is
    /// killed and the plan artifact, if any, is removed.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Timeout`] if the bound expires, otherwise
    /// whatever [`Self::generate_plan`] returns.
    pub async fn generate_plan_within(&self, source_dir: &Path, limit: Duration) -> Result<ChangeGraph> {
        tokio::time::timeout(limit, self.generate_plan(source_dir))
            .await
            .map_err(|_| {
                warn!("Plan generation exceeded {}s", limit.as_secs());
                ToolError::Timeout {
                    secs: limit.as_secs(),
                }
            })?
    }

    /// Generates the plan and evaluates expectations against it.
    ///
    /// # Errors
    ///
    /// Returns an error if plan generation fails or an attribute path is
    /// malformed. Failed checks are reported in the [`CheckReport`], not
    /// as an error.
    pub async fn check(&self, source_dir: &Path, expectations: &[Expectation]) -> Result<CheckReport> {
        let graph = self.generate_plan(source_dir).await?;
        AssertionEvaluator::new().evaluate(&graph, expectations)
    }

    async fn run_step(&self, step: PlanStep, source_dir: &Path) -> Result<ToolOutput> {
        let invocation = ToolInvocation {
            step,
            program: self.tool.binary.clone(),
            args: step.args(&self.tool.plan_file),
            working_dir: source_dir.to_path_buf(),
            env: self.tool.env.clone(),
        };

        debug!("Step '{step}': {}", invocation.command_line());

        let output = self.runner.run(&invocation).await.map_err(|e| ToolError::SpawnFailed {
            step: step.as_str().to_string(),
            message: e.to_string(),
        })?;

        if !output.success() {
            return Err(ToolError::StepFailed {
                step: step.as_str().to_string(),
                exit_code: output.exit_code,
                diagnostics: output.diagnostics(),
            }
            .into());
        }

        debug!("Step '{step}' completed");
        Ok(output)
    }
}

/// Returns the changes of the given type, in plan order.
#[must_use]
pub fn find_changes<'g>(graph: &'g ChangeGraph, resource_type: &str) -> Vec<&'g ResourceChange> {
    graph.find_changes(resource_type)
}

/// Navigates a change's `after` snapshot. See
/// [`ResourceChange::attribute_after`].
#[must_use]
pub fn attribute_after<'c>(change: &'c ResourceChange, path: &AttributePath) -> Option<&'c PlanValue> {
    change.attribute_after(path)
}
