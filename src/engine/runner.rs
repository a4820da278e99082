//! External command execution.
//!
//! The engine never spawns processes directly; it goes through a
//! [`ToolRunner`] so that tests can script the tool's behavior.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// One step of the plan-generation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStep {
    /// Initialize the working directory without a remote backend.
    Init,
    /// Produce the plan artifact.
    Plan,
    /// Render the plan artifact as JSON on stdout.
    Show,
}

/// A fully resolved command line for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Step this invocation belongs to.
    pub step: PlanStep,
    /// Executable to run.
    pub program: String,
    /// Arguments after the program name.
    pub args: Vec<String>,
    /// Working directory.
    pub working_dir: PathBuf,
    /// Extra environment variables.
    pub env: BTreeMap<String, String>,
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Runs external commands to completion.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Runs the invocation and waits for it to exit.
    ///
    /// A non-zero exit is not an error at this level; only failures to
    /// start or wait on the process are.
    async fn run(&self, invocation: &ToolInvocation) -> std::io::Result<ToolOutput>;
}

/// Runner backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl PlanStep {
    /// Returns the step name used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Plan => "plan",
            Self::Show => "show",
        }
    }

    /// Returns the tool arguments for this step.
    #[must_use]
    pub fn args(self, plan_file: &str) -> Vec<String> {
        match self {
            Self::Init => vec![String::from("init"), String::from("-backend=false")],
            Self::Plan => vec![
                String::from("plan"),
                format!("-out={plan_file}"),
                String::from("-input=false"),
                String::from("-lock=false"),
                String::from("-refresh=false"),
            ],
            Self::Show => vec![
                String::from("show"),
                String::from("-json"),
                plan_file.to_string(),
            ],
        }
    }
}

impl std::fmt::Display for PlanStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToolInvocation {
    /// Returns the command line for display.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ToolOutput {
    /// Returns true if the process exited with status 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }

    /// Returns the most useful diagnostic text: stderr, or stdout if
    /// stderr is empty.
    #[must_use]
    pub fn diagnostics(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, invocation: &ToolInvocation) -> std::io::Result<ToolOutput> {
        debug!(
            "Running '{}' in {}",
            invocation.command_line(),
            invocation.working_dir.display()
        );

        // Dropping the future (e.g. on a caller timeout) kills the child.
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .envs(&invocation.env)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(ToolOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
