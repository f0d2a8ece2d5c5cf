//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file instead of the search order
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Gangway - onboard apps to the platform and wire their GitOps environments
#[derive(Parser, Debug)]
#[command(name = "gw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file (KEY=value)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run as if gw was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available templates
    #[command(
        name = "templates",
        long_about = "List available templates.\n\n\
            Shows the platform's global templates alongside your account's own \
            templates. Both listings come fresh from the API on every run.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Everything you can scaffold from
    gw templates

    # Only templates for one language
    gw templates --language go"
    )]
    Templates {
        /// Only show templates for this language
        #[arg(long)]
        language: Option<String>,
    },

    /// Show one template descriptor
    #[command(
        name = "template",
        long_about = "Show one template descriptor.\n\n\
            Fetches the template's metadata: source organization and repository, \
            language, scope, and (for account templates) the replacement string \
            substituted during scaffolding."
    )]
    Template {
        /// Template name
        name: String,

        /// Look the template up in the global catalog instead of the account's
        #[arg(long)]
        global: bool,
    },

    /// Create the configured app from its template
    #[command(
        name = "create",
        long_about = "Create the configured app from its template.\n\n\
            Validates the app name, checks that no app with that name exists, \
            resolves the configured template, and submits the creation request. \
            The platform scaffolds the app's repositories and reports them back.\n\n\
            With --environments, GitOps setup runs for the listed environments \
            once creation has fully completed.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Create the app only
    gw create

    # Create the app, then wire dev and qa
    gw create --environments dev,qa

CONFIGURATION:
    Requires the base keys plus TEMPLATE_NAME, APP_VISIBILITY, and
    APP_DESCRIPTION; --environments additionally requires the GitOps
    credential triad (GIT_USERNAME, GIT_TOKEN, GIT_EMAIL)."
    )]
    Create {
        /// Also run GitOps setup for these environments afterwards
        #[arg(long, value_name = "CSV")]
        environments: Option<String>,
    },

    /// Prepare GitOps repositories for the listed environments
    #[command(
        name = "setup",
        long_about = "Prepare GitOps repositories for the listed environments.\n\n\
            Fetches the app's notifications secret once, then for each listed \
            environment clones (or reuses) the {app}-argocd-{env} repository, \
            writes the environment file and the secret copy, checks cluster \
            access, and runs the repository's setup-argocd.sh.\n\n\
            A failing environment never stops the others; the run ends with a \
            per-environment tally.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Wire dev and qa
    gw setup dev,qa

    # Environments are processed in the order listed
    gw setup staging,prod

NOTES:
    Valid environments are dev, qa, staging, and prod. Unrecognized names
    are skipped with a warning. Cluster access (kubectl reaching the
    target cluster) is a precondition gangway checks but does not set up."
    )]
    Setup {
        /// Comma-separated environment list (dev, qa, staging, prod)
        environments: String,
    },

    /// Generate shell completion scripts
    #[command(name = "completion")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_create_with_environments() {
        let cli = Cli::try_parse_from(["gw", "create", "--environments", "dev,qa"]).unwrap();
        match cli.command {
            Command::Create { environments } => {
                assert_eq!(environments.as_deref(), Some("dev,qa"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_apply_after_subcommand() {
        let cli = Cli::try_parse_from(["gw", "setup", "dev", "--quiet", "--config", "x.env"])
            .unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("x.env")));
    }
}
