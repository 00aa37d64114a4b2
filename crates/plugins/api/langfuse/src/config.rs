//! Langfuse adapter configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::{json, Value};
use toolbelt_core::config::redact;
use toolbelt_core::{EnvReader, EnvSource, Error, Result, ToolFilter};
use toolbelt_pipeline::truncation::{default_spill_dir, DEFAULT_THRESHOLD};
use toolbelt_pipeline::Truncator;

use crate::{DEFAULT_LANGFUSE_URL, GROUPS};

const ENV_PREFIX: &str = "LANGFUSE";

/// Settings read from `LANGFUSE_*` variables and `TOOLBELT_SPILL_DIR`.
#[derive(Debug, Clone)]
pub struct LangfuseConfig {
    pub public_key: String,
    pub secret_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub filter: ToolFilter,
    pub truncate_threshold: usize,
    pub spill_dir: PathBuf,
}

impl LangfuseConfig {
    pub fn from_env(source: &dyn EnvSource) -> Result<Self> {
        let env = EnvReader::new(source, ENV_PREFIX);

        let truncate_threshold = match env.number("TRUNCATE_THRESHOLD")? {
            Some(0) => {
                return Err(Error::Config(format!(
                    "{} must be greater than zero",
                    env.key("TRUNCATE_THRESHOLD")
                )))
            }
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
            None => DEFAULT_THRESHOLD,
        };

        Ok(Self {
            public_key: env.required("PUBLIC_KEY")?,
            secret_key: env.required("SECRET_KEY")?,
            base_url: env
                .optional("BASE_URL")
                .unwrap_or_else(|| DEFAULT_LANGFUSE_URL.to_string()),
            timeout: env.timeout()?,
            filter: env.tool_filter(GROUPS)?,
            truncate_threshold,
            spill_dir: env
                .spill_dir()
                .map(PathBuf::from)
                .unwrap_or_else(default_spill_dir),
        })
    }

    pub fn truncator(&self) -> Truncator {
        Truncator::new(&self.spill_dir).with_threshold(self.truncate_threshold)
    }

    /// Config resource contents. Keys are never included.
    pub fn describe(&self) -> Value {
        json!({
            "public_key": redact(Some(&self.public_key)),
            "secret_key": redact(Some(&self.secret_key)),
            "base_url": self.base_url,
            "request_timeout_secs": self.timeout.as_secs(),
            "truncate_threshold": self.truncate_threshold,
            "spill_dir": self.spill_dir.display().to_string(),
            "tools": self.filter.describe(),
            "server_version": env!("CARGO_PKG_VERSION"),
        })
    }
}
