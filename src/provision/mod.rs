//! provision
//!
//! App creation and environment setup orchestration.
//!
//! # Failure isolation
//!
//! The orchestrator separates preconditions from per-item work: the
//! notifications secret fetch is a precondition and aborts the whole
//! operation, while each environment's provisioning failure is recorded
//! in its report and the run continues with the next environment.

pub mod app;
pub mod env;
pub mod workspace;

pub use app::{create_app, CreateError, CreatedApp};
pub use env::{EnvError, EnvName};

use std::path::Path;

use thiserror::Error;

use crate::config::Config;
use crate::exec::ToolRunner;
use crate::platform::client::{ClientError, PlatformClient};

/// Errors that abort environment setup before any environment is touched.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The configuration was not validated for environment setup.
    #[error("configuration is missing the GitOps credentials")]
    CredentialsMissing,

    /// The shared notifications secret could not be fetched; it is a
    /// precondition for every environment.
    #[error("failed to fetch the notifications secret: {0}")]
    Secret(#[source] ClientError),
}

/// Outcome record for one environment.
#[derive(Debug)]
pub struct EnvReport {
    pub env: EnvName,
    pub outcome: Result<(), EnvError>,
}

impl EnvReport {
    /// Whether this environment finished setup.
    pub fn ready(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Result of an environment setup run.
#[derive(Debug)]
pub struct SetupOutcome {
    /// Per-environment reports, in the order listed by the caller.
    pub reports: Vec<EnvReport>,
    /// Entries skipped because the name is not a recognized environment.
    pub skipped: Vec<String>,
}

impl SetupOutcome {
    /// (ready, attempted) counts.
    pub fn tally(&self) -> (usize, usize) {
        let ready = self.reports.iter().filter(|r| r.ready()).count();
        (ready, self.reports.len())
    }
}

/// Set up GitOps repositories for a comma-separated environment list.
///
/// Fetches the notifications secret once, then provisions each listed
/// environment in order. Unrecognized names are skipped (recorded in
/// [`SetupOutcome::skipped`]); recognized ones always produce a report,
/// success or failure.
pub async fn setup_environments(
    client: &PlatformClient,
    config: &Config,
    runner: &dyn ToolRunner,
    root: &Path,
    csv: &str,
) -> Result<SetupOutcome, SetupError> {
    let gitops = config.gitops.as_ref().ok_or(SetupError::CredentialsMissing)?;

    let secret_path = format!(
        "/accounts/{}/organizations/{}/apps/{}/notifications-secret",
        config.account, config.org, config.app_name
    );
    let secret = client.get(&secret_path).await.map_err(SetupError::Secret)?;

    let mut outcome = SetupOutcome {
        reports: Vec::new(),
        skipped: Vec::new(),
    };
    // Order preserved, duplicates kept: the caller's list is the plan.
    for entry in csv.split(',').map(str::trim) {
        match entry.parse::<EnvName>() {
            Ok(env) => {
                let result = env::provision(config, gitops, runner, root, env, &secret);
                outcome.reports.push(EnvReport {
                    env,
                    outcome: result,
                });
            }
            Err(_) => outcome.skipped.push(entry.to_string()),
        }
    }
    Ok(outcome)
}
