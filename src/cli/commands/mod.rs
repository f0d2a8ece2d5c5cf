//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads and validates configuration for its operation
//! 2. Runs the workflow against the platform
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! Commands that talk to the platform are async because they involve
//! network I/O. Each handler is a synchronous wrapper that constructs a
//! tokio runtime and blocks on the async implementation.

mod completion;
mod create;
mod setup;
mod templates;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use create::create;
pub use setup::setup;
pub use templates::{list as templates_list, show as template_show};

use anyhow::Result;

use super::args::Command;
use super::Context;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Templates { language } => templates::list(ctx, language.as_deref()),
        Command::Template { name, global } => templates::show(ctx, &name, global),
        Command::Create { environments } => create::create(ctx, environments.as_deref()),
        Command::Setup { environments } => setup::setup(ctx, &environments),
        Command::Completion { shell } => completion::completion(shell),
    }
}
