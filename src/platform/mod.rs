//! platform
//!
//! Platform API layer: the rate-limited HTTP client and the template
//! catalog reader built on top of it.

pub mod client;
pub mod templates;

pub use client::{ClientError, Pacing, PlatformClient, Probe};
pub use templates::{TemplateDescriptor, TemplateError, TemplateSummary};
