//! provision::env
//!
//! Per-environment provisioning.
//!
//! # Lifecycle
//!
//! Each environment walks `Validate -> CloneOrReuse -> Configure ->
//! Preflight -> Execute`; any failure is terminal for that environment
//! only and is reported back as its outcome. There is no automatic retry
//! at this level (the API client's 429 retry is request-level).

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::config::{Config, GitOpsSettings};
use crate::exec::{ExecError, Invocation, ToolRunner};

use super::workspace;

/// Setup entrypoint script expected at the root of every environment repo.
pub const ENTRYPOINT: &str = "setup-argocd.sh";

/// Cluster-connectivity CLI required on the execution path.
pub const CLUSTER_CLI: &str = "kubectl";

/// Variable naming the target environment for the entrypoint.
pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";

/// A deployment target tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvName {
    Dev,
    Qa,
    Staging,
    Prod,
}

impl EnvName {
    /// All recognized environments, in promotion order.
    pub const ALL: [EnvName; 4] = [EnvName::Dev, EnvName::Qa, EnvName::Staging, EnvName::Prod];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnvName::Dev => "dev",
            EnvName::Qa => "qa",
            EnvName::Staging => "staging",
            EnvName::Prod => "prod",
        }
    }
}

impl fmt::Display for EnvName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for environment names outside the recognized set.
#[derive(Debug, Clone, Error)]
#[error("unknown environment '{0}'")]
pub struct UnknownEnv(pub String);

impl FromStr for EnvName {
    type Err = UnknownEnv;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(EnvName::Dev),
            "qa" => Ok(EnvName::Qa),
            "staging" => Ok(EnvName::Staging),
            "prod" => Ok(EnvName::Prod),
            other => Err(UnknownEnv(other.to_string())),
        }
    }
}

/// Failures scoped to one environment's provisioning.
///
/// These never abort the run; the orchestrator records them per
/// environment and moves on.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Clone failed (repository missing or access denied).
    #[error("clone of {url} failed: {message}")]
    CloneFailed { url: String, message: String },

    /// Workspace file could not be written.
    #[error("failed to write {path}: {source}")]
    Workspace {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The setup entrypoint is missing from the checkout.
    #[error("no {ENTRYPOINT} in {0}; the environment repository is not set up for onboarding")]
    MissingEntrypoint(PathBuf),

    /// The cluster CLI is not on the execution path.
    #[error("{CLUSTER_CLI} not found on PATH; per-environment cluster access is a precondition")]
    MissingClusterCli,

    /// The cluster CLI cannot reach the target cluster.
    #[error(
        "{CLUSTER_CLI} cannot reach the {env} cluster; configure cluster access before onboarding"
    )]
    ClusterUnreachable { env: EnvName },

    /// The entrypoint ran and exited non-zero.
    #[error("{ENTRYPOINT} exited with code {code} for {env}")]
    EntrypointFailed { env: EnvName, code: i32 },

    /// An external tool failed to launch.
    #[error(transparent)]
    Tool(#[from] ExecError),
}

/// Provision one environment: clone or reuse its workspace, configure it,
/// preflight the cluster tooling, and run the setup entrypoint.
pub fn provision(
    config: &Config,
    gitops: &GitOpsSettings,
    runner: &dyn ToolRunner,
    root: &Path,
    env: EnvName,
    secret: &str,
) -> Result<(), EnvError> {
    let workspace = workspace::clone_or_reuse(config, gitops, root, env)?;
    workspace::write_env_file(config, gitops, &workspace, env)?;
    workspace::write_secret(&workspace, secret)?;
    preflight(runner, &workspace, env)?;
    execute(runner, &workspace, env)
}

/// Check the workspace entrypoint and cluster reachability.
fn preflight(runner: &dyn ToolRunner, workspace: &Path, env: EnvName) -> Result<(), EnvError> {
    if !workspace.join(ENTRYPOINT).is_file() {
        return Err(EnvError::MissingEntrypoint(workspace.to_path_buf()));
    }
    if runner.lookup(CLUSTER_CLI).is_none() {
        return Err(EnvError::MissingClusterCli);
    }
    let exit = runner.run_silent(&Invocation::new(CLUSTER_CLI, &["cluster-info"], workspace))?;
    if !exit.success() {
        return Err(EnvError::ClusterUnreachable { env });
    }
    Ok(())
}

/// Run the setup entrypoint with the environment bound as context.
fn execute(runner: &dyn ToolRunner, workspace: &Path, env: EnvName) -> Result<(), EnvError> {
    let invocation =
        Invocation::new("bash", &[ENTRYPOINT], workspace).env(ENVIRONMENT_VAR, env.as_str());
    let exit = runner.run(&invocation)?;
    if exit.success() {
        Ok(())
    } else {
        Err(EnvError::EntrypointFailed {
            env,
            code: exit.code,
        })
    }
}
