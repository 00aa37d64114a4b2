//! Langfuse adapter for toolbelt.
//!
//! Read-only access to traces and observations through the Langfuse public
//! API. Payloads go through a truncating pipeline: string fields longer than
//! the threshold are cut to a preview and the full text is written to a
//! spill file.

mod client;
mod config;
mod server;
mod tools;
mod types;

pub use client::{LangfuseApi, LangfuseClient};
pub use config::LangfuseConfig;
pub use server::{build_server, config_resource, CONFIG_URI};
pub use tools::all_tools;
pub use types::*;

/// Default Langfuse URL.
pub const DEFAULT_LANGFUSE_URL: &str = "https://cloud.langfuse.com";

/// Service name used in error messages.
pub const SERVICE: &str = "Langfuse";

pub const GROUP_TRACES: &str = "traces";
pub const GROUP_OBSERVATIONS: &str = "observations";

/// Tool groups this adapter recognizes.
pub const GROUPS: &[&str] = &[GROUP_TRACES, GROUP_OBSERVATIONS];
