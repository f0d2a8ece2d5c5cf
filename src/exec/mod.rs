//! exec
//!
//! External tool boundary.
//!
//! # Design
//!
//! Environment setup shells out to two tools: the cluster CLI (for the
//! reachability preflight) and the per-repository setup entrypoint. Both
//! go through the [`ToolRunner`] trait so tests substitute [`FakeRunner`],
//! a scripted implementation that records invocations.

pub mod fake;

pub use fake::FakeRunner;

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

/// Errors from launching external tools.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The tool could not be started at all.
    #[error("failed to launch {program}: {message}")]
    Launch { program: String, message: String },
}

/// One external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// Working directory for the tool.
    pub cwd: PathBuf,
    /// Extra environment variables.
    pub env: Vec<(String, String)>,
}

impl Invocation {
    /// Build an invocation running in `cwd` with no extra environment.
    pub fn new(program: impl Into<String>, args: &[&str], cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            cwd: cwd.to_path_buf(),
            env: Vec::new(),
        }
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Exit of an external tool run to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolExit {
    /// Process exit code (killed-by-signal maps to 1).
    pub code: i32,
}

impl ToolExit {
    /// Whether the tool exited zero.
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Capability interface over external tools.
///
/// Implementations must be `Send + Sync`; the system implementation is
/// [`SystemRunner`], tests use [`fake::FakeRunner`].
pub trait ToolRunner: Send + Sync {
    /// Resolve a program on the execution path.
    fn lookup(&self, program: &str) -> Option<PathBuf>;

    /// Run a tool to completion.
    fn run(&self, invocation: &Invocation) -> Result<ToolExit, ExecError>;

    /// Run a tool, discarding its output. Used for probes whose chatter
    /// would drown the real progress lines.
    fn run_silent(&self, invocation: &Invocation) -> Result<ToolExit, ExecError>;
}

/// Runner backed by the real system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(invocation: &Invocation) -> Command {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        command
    }

    fn wait(invocation: &Invocation, mut command: Command) -> Result<ToolExit, ExecError> {
        let status = command.status().map_err(|e| ExecError::Launch {
            program: invocation.program.clone(),
            message: e.to_string(),
        })?;
        Ok(ToolExit {
            code: status.code().unwrap_or(1),
        })
    }
}

impl ToolRunner for SystemRunner {
    fn lookup(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    fn run(&self, invocation: &Invocation) -> Result<ToolExit, ExecError> {
        Self::wait(invocation, Self::command(invocation))
    }

    fn run_silent(&self, invocation: &Invocation) -> Result<ToolExit, ExecError> {
        let mut command = Self::command(invocation);
        command.stdout(Stdio::null()).stderr(Stdio::null());
        Self::wait(invocation, command)
    }
}
