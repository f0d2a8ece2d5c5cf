//! cli::commands::create
//!
//! Create the configured app from its template, optionally followed by
//! environment setup.
//!
//! # Design
//!
//! App creation always fully completes (or fails fast) before any
//! environment provisioning begins. With `--environments`, the config is
//! validated for both operations up front so a missing GitOps credential
//! is caught before the app is created.

use anyhow::Result;

use crate::cli::commands::setup::run_setup;
use crate::cli::Context;
use crate::config::{self, Operation};
use crate::platform::PlatformClient;
use crate::provision;
use crate::ui::output;

/// Run the create command.
pub fn create(ctx: &Context, environments: Option<&str>) -> Result<()> {
    let operation = if environments.is_some() {
        Operation::Onboard
    } else {
        Operation::CreateApp
    };
    let config = config::load(ctx.config.as_deref(), operation)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(create_async(ctx, &config, environments))
}

async fn create_async(
    ctx: &Context,
    config: &config::Config,
    environments: Option<&str>,
) -> Result<()> {
    let verbosity = ctx.verbosity();
    let client = PlatformClient::new(&config.api_base, &config.api_key);

    output::debug(
        format!("creating app '{}' in {}", config.app_name, config.org),
        verbosity,
    );
    let created = provision::create_app(&client, config).await?;

    output::print(format!("Created app '{}'", config.app_name), verbosity);
    for (role, repo) in &created.repos {
        output::print(format!("  {:<12} {}", role, repo), verbosity);
    }

    if let Some(csv) = environments {
        run_setup(ctx, config, &client, csv).await?;
    }
    Ok(())
}
