//! AppSignal adapter configuration.

use std::time::Duration;

use serde_json::{json, Value};
use toolbelt_core::config::redact;
use toolbelt_core::{EnvReader, EnvSource, Result, Session, ToolFilter};

use crate::{APP_SELECTION, DEFAULT_APPSIGNAL_URL, GROUPS};

const ENV_PREFIX: &str = "APPSIGNAL";

/// Settings read from `APPSIGNAL_*` variables.
#[derive(Debug, Clone)]
pub struct AppSignalConfig {
    pub api_key: String,
    /// App preselected for incident tools
    pub app_id: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub filter: ToolFilter,
}

impl AppSignalConfig {
    pub fn from_env(source: &dyn EnvSource) -> Result<Self> {
        let env = EnvReader::new(source, ENV_PREFIX);

        Ok(Self {
            api_key: env.required("API_KEY")?,
            app_id: env.optional("APP_ID"),
            base_url: env
                .optional("BASE_URL")
                .unwrap_or_else(|| DEFAULT_APPSIGNAL_URL.to_string()),
            timeout: env.timeout()?,
            filter: env.tool_filter(GROUPS)?,
        })
    }

    /// Config resource contents. The API key is never included.
    pub fn describe(&self, session: &Session) -> Value {
        json!({
            "api_key": redact(Some(&self.api_key)),
            "base_url": self.base_url,
            "selected_app_id": session.selected(APP_SELECTION),
            "request_timeout_secs": self.timeout.as_secs(),
            "tools": self.filter.describe(),
            "server_version": env!("CARGO_PKG_VERSION"),
        })
    }
}
