//! cli::commands::setup
//!
//! Prepare GitOps repositories for a list of environments.
//!
//! # Exit behavior
//!
//! Precondition failures (config, secret fetch) are hard errors. A
//! failing environment is not: the run reports a per-environment tally
//! and exits zero even when some environments failed, so a partially
//! onboarded app can be finished with a later run.

use anyhow::Result;

use crate::cli::Context;
use crate::config::{self, Operation};
use crate::exec::SystemRunner;
use crate::platform::PlatformClient;
use crate::provision;
use crate::ui::output;

/// Run the setup command.
pub fn setup(ctx: &Context, environments: &str) -> Result<()> {
    let config = config::load(ctx.config.as_deref(), Operation::SetupEnvironments)?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let client = PlatformClient::new(&config.api_base, &config.api_key);
        run_setup(ctx, &config, &client, environments).await
    })
}

/// Shared by `setup` and `create --environments`.
pub(crate) async fn run_setup(
    ctx: &Context,
    config: &config::Config,
    client: &PlatformClient,
    environments: &str,
) -> Result<()> {
    let verbosity = ctx.verbosity();
    let runner = SystemRunner;
    let root = ctx.working_dir()?;

    let outcome = provision::setup_environments(client, config, &runner, &root, environments).await?;

    for name in &outcome.skipped {
        output::warn(
            format!("skipping unknown environment '{name}' (expected dev, qa, staging, or prod)"),
            verbosity,
        );
    }
    for report in &outcome.reports {
        match &report.outcome {
            Ok(()) => output::print(format!("  {:<8} ready", report.env), verbosity),
            Err(err) => output::print(format!("  {:<8} failed: {err}", report.env), verbosity),
        }
    }
    let (ready, attempted) = outcome.tally();
    output::print(
        format!("{ready} of {attempted} environments ready"),
        verbosity,
    );
    Ok(())
}
