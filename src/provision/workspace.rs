//! provision::workspace
//!
//! Per-environment workspace management.
//!
//! A workspace is the local checkout of `{app}-argocd-{env}`, owned
//! exclusively by that environment's provisioning step. It is created by
//! clone-if-absent and mutated by writing the generated environment file
//! and the secret copy; gangway never deletes it (it persists as a
//! GitOps-managed checkout).

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Config, GitOpsSettings};

use super::env::{EnvError, EnvName, ENVIRONMENT_VAR};

/// Generated environment file written into the workspace root.
pub const ENV_FILE: &str = "gitops.env";

/// Copy of the notifications secret written into the workspace root.
pub const SECRET_FILE: &str = "notifications-secret.yaml";

/// Directory (and repository) name for one environment of one app.
pub fn dir_name(app: &str, env: EnvName) -> String {
    format!("{app}-argocd-{env}")
}

/// Remote URL of the environment repository.
pub fn repo_url(git_base: &str, org: &str, app: &str, env: EnvName) -> String {
    format!("{git_base}/{org}/{}.git", dir_name(app, env))
}

/// Clone the environment repository, or reuse an existing checkout.
///
/// Reuse keeps whatever is already on disk; the follow-up configure step
/// overwrites the generated files, which makes repeat runs idempotent.
pub fn clone_or_reuse(
    config: &Config,
    gitops: &GitOpsSettings,
    root: &Path,
    env: EnvName,
) -> Result<PathBuf, EnvError> {
    let path = root.join(dir_name(&config.app_name, env));
    if path.is_dir() {
        return Ok(path);
    }

    let url = repo_url(&config.git_base, &config.org, &config.app_name, env);
    let username = gitops.username.clone();
    let token = gitops.token.clone();
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(move |_url, _username, _allowed| {
        git2::Cred::userpass_plaintext(&username, &token)
    });
    let mut fetch = git2::FetchOptions::new();
    fetch.remote_callbacks(callbacks);

    git2::build::RepoBuilder::new()
        .fetch_options(fetch)
        .clone(&url, &path)
        .map_err(|e| EnvError::CloneFailed {
            url,
            message: e.message().to_string(),
        })?;
    Ok(path)
}

/// Write the generated environment file.
///
/// Contains exactly the GitOps credential triad, the org/app identifiers,
/// and the resolved environment name. API credentials and app-creation
/// settings are excluded.
pub fn write_env_file(
    config: &Config,
    gitops: &GitOpsSettings,
    workspace: &Path,
    env: EnvName,
) -> Result<(), EnvError> {
    let contents = format!(
        "GIT_USERNAME={}\nGIT_TOKEN={}\nGIT_EMAIL={}\nORG={}\nAPP_NAME={}\n{ENVIRONMENT_VAR}={}\n",
        gitops.username, gitops.token, gitops.email, config.org, config.app_name, env
    );
    write(workspace.join(ENV_FILE), &contents)
}

/// Copy the shared notifications secret into the workspace.
pub fn write_secret(workspace: &Path, secret: &str) -> Result<(), EnvError> {
    write(workspace.join(SECRET_FILE), secret)
}

fn write(path: PathBuf, contents: &str) -> Result<(), EnvError> {
    fs::write(&path, contents).map_err(|source| EnvError::Workspace { path, source })
}
