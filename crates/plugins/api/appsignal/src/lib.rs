//! AppSignal adapter for toolbelt.
//!
//! Exposes app listing and selection plus exception and performance
//! incidents as MCP tools. Incidents can only be listed by the API, so
//! lookups by number scan the listing page by page.

mod client;
mod config;
mod server;
mod tools;
mod types;

pub use client::{find_exception_incident, find_performance_incident, AppSignalApi, AppSignalClient};
pub use config::AppSignalConfig;
pub use server::{build_server, config_resource, CONFIG_URI};
pub use tools::all_tools;
pub use types::*;

/// Default AppSignal URL.
pub const DEFAULT_APPSIGNAL_URL: &str = "https://appsignal.com";

/// Service name used in error messages.
pub const SERVICE: &str = "AppSignal";

/// Session key of the selected app.
pub const APP_SELECTION: &str = "app";

pub const GROUP_APPS: &str = "apps";
pub const GROUP_INCIDENTS: &str = "incidents";

/// Tool groups this adapter recognizes.
pub const GROUPS: &[&str] = &[GROUP_APPS, GROUP_INCIDENTS];
