//! Core error handling, configuration and shared building blocks for toolbelt.
//!
//! This crate provides the foundational pieces used by every adapter:
//! the error taxonomy with HTTP status mapping, environment configuration,
//! the per-server [`Session`], and the paginated [`Scan`] lookup.

pub mod config;
pub mod error;
pub mod scan;
pub mod session;

pub use config::{EnvReader, EnvSource, ProcessEnv, ToolFilter};
pub use error::{Error, Result};
pub use scan::{Paginated, Scan};
pub use session::Session;
