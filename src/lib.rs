//! Gangway - onboarding CLI for platform apps and their GitOps environments
//!
//! Gangway (`gw`) scaffolds a new application through the platform API and
//! prepares one GitOps repository per deployment environment for the
//! cluster-side continuous-deployment controller.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to handlers)
//! - [`config`] - Configuration object, file reading, per-operation validation
//! - [`platform`] - Rate-limited API client and template catalog reader
//! - [`provision`] - App creation workflow and environment setup orchestration
//! - [`exec`] - External tool boundary (cluster CLI, setup entrypoint)
//! - [`ui`] - User-facing output utilities
//!
//! # Failure model
//!
//! Gangway distinguishes preconditions from per-item work:
//!
//! 1. Configuration and app-name validation fail before any network call
//! 2. HTTP 429 is retried transparently; other API errors fail the operation
//!    with the upstream payload attached
//! 3. Environment setup isolates failures per environment and reports a
//!    per-environment tally instead of aborting the run

pub mod cli;
pub mod config;
pub mod exec;
pub mod platform;
pub mod provision;
pub mod ui;
