//! cli::commands::templates
//!
//! Template catalog commands: list the catalogs, show one descriptor.

use anyhow::Result;

use crate::cli::Context;
use crate::config::{self, Operation};
use crate::platform::templates::{self, TemplateSummary};
use crate::platform::PlatformClient;
use crate::ui::{output, Verbosity};

/// Run the templates listing command.
pub fn list(ctx: &Context, language: Option<&str>) -> Result<()> {
    let config = config::load(ctx.config.as_deref(), Operation::Templates)?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(list_async(ctx, &config, language))
}

async fn list_async(ctx: &Context, config: &config::Config, language: Option<&str>) -> Result<()> {
    let verbosity = ctx.verbosity();
    let client = PlatformClient::new(&config.api_base, &config.api_key);
    let (global, account) = templates::list(&client, &config.account, language).await?;

    print_section(&format!("Global templates ({})", global.len()), &global, verbosity);
    print_section(
        &format!("Account templates ({})", account.len()),
        &account,
        verbosity,
    );
    Ok(())
}

fn print_section(heading: &str, rows: &[TemplateSummary], verbosity: Verbosity) {
    output::print(heading, verbosity);
    if rows.is_empty() {
        output::print("  (none)", verbosity);
        return;
    }
    for row in rows {
        output::print(
            format!("  {:<24} {:<10} {}", row.name, row.language, row.description),
            verbosity,
        );
    }
}

/// Run the single-template show command.
pub fn show(ctx: &Context, name: &str, global: bool) -> Result<()> {
    let config = config::load(ctx.config.as_deref(), Operation::Templates)?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(show_async(ctx, &config, name, global))
}

async fn show_async(ctx: &Context, config: &config::Config, name: &str, global: bool) -> Result<()> {
    let verbosity = ctx.verbosity();
    let client = PlatformClient::new(&config.api_base, &config.api_key);
    let (descriptor, _raw) = templates::fetch(&client, &config.account, name, global).await?;

    let scope = if descriptor.is_global {
        "global"
    } else {
        "account"
    };
    output::print(name, verbosity);
    output::print(
        output::format_pairs([
            ("scope", scope),
            ("org", descriptor.org_login.as_str()),
            ("source", descriptor.source_repo.as_str()),
            ("language", descriptor.language.as_str()),
            (
                "replacement",
                descriptor.replacement_string.as_deref().unwrap_or("-"),
            ),
        ]),
        verbosity,
    );
    Ok(())
}
