//! Environment-based configuration for toolbelt adapters.
//!
//! Every adapter is configured exclusively through environment variables.
//! Values are read through [`EnvSource`] so tests can supply a plain map
//! instead of mutating the process environment.
//!
//! # Example
//!
//! ```ignore
//! use toolbelt_core::config::{EnvReader, ProcessEnv};
//!
//! let env = EnvReader::new(&ProcessEnv, "APPSIGNAL");
//! let api_key = env.required("API_KEY")?;          // APPSIGNAL_API_KEY
//! let timeout = env.timeout()?;                     // APPSIGNAL_REQUEST_TIMEOUT_SECS
//! let filter = env.tool_filter(&["apps", "incidents"])?;
//! ```

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::{Error, Result};

/// Placeholder reported instead of secret values.
pub const REDACTED: &str = "***configured***";

/// Default timeout for outbound HTTP requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable overriding the truncation spill directory.
pub const SPILL_DIR_VAR: &str = "TOOLBELT_SPILL_DIR";

// =============================================================================
// Environment sources
// =============================================================================

/// Source of environment variables.
pub trait EnvSource: Send + Sync {
    /// Look up a variable. Unset and non-unicode values are `None`.
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Reader for variables sharing an adapter prefix (`APPSIGNAL_`, `LANGFUSE_`).
pub struct EnvReader<'a> {
    source: &'a dyn EnvSource,
    prefix: &'a str,
}

impl<'a> EnvReader<'a> {
    pub fn new(source: &'a dyn EnvSource, prefix: &'a str) -> Self {
        Self { source, prefix }
    }

    /// Full variable name for a suffix.
    pub fn key(&self, suffix: &str) -> String {
        format!("{}_{}", self.prefix, suffix)
    }

    /// Read an optional variable; blank values count as unset.
    pub fn optional(&self, suffix: &str) -> Option<String> {
        let key = self.key(suffix);
        let value = self
            .source
            .var(&key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        debug!(key = %key, present = value.is_some(), "Read environment variable");
        value
    }

    /// Read a required variable.
    pub fn required(&self, suffix: &str) -> Result<String> {
        self.optional(suffix).ok_or_else(|| {
            Error::Config(format!(
                "{} environment variable is required",
                self.key(suffix)
            ))
        })
    }

    /// Read an optional unsigned number.
    pub fn number(&self, suffix: &str) -> Result<Option<u64>> {
        match self.optional(suffix) {
            None => Ok(None),
            Some(raw) => raw.parse::<u64>().map(Some).map_err(|_| {
                Error::Config(format!(
                    "{} must be a non-negative integer, got '{}'",
                    self.key(suffix),
                    raw
                ))
            }),
        }
    }

    /// Request timeout from `<PREFIX>_REQUEST_TIMEOUT_SECS`, defaulting to 30s.
    pub fn timeout(&self) -> Result<Duration> {
        match self.number("REQUEST_TIMEOUT_SECS")? {
            Some(0) => Err(Error::Config(format!(
                "{} must be greater than zero",
                self.key("REQUEST_TIMEOUT_SECS")
            ))),
            Some(secs) => Ok(Duration::from_secs(secs)),
            None => Ok(DEFAULT_REQUEST_TIMEOUT),
        }
    }

    /// Tool filter from `<PREFIX>_ENABLED_TOOLGROUPS` and `<PREFIX>_ENABLED_TOOLS`.
    pub fn tool_filter(&self, known_groups: &[&'static str]) -> Result<ToolFilter> {
        let groups = self.optional("ENABLED_TOOLGROUPS");
        let tools = self.optional("ENABLED_TOOLS");
        ToolFilter::parse(groups.as_deref(), tools.as_deref(), known_groups)
    }

    /// Spill directory override shared by all adapters (unprefixed).
    pub fn spill_dir(&self) -> Option<String> {
        self.source
            .var(SPILL_DIR_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Report a secret for display: the placeholder when set, `null` otherwise.
pub fn redact(secret: Option<&str>) -> Value {
    match secret {
        Some(s) if !s.is_empty() => Value::String(REDACTED.to_string()),
        _ => Value::Null,
    }
}

// =============================================================================
// Tool filter
// =============================================================================

/// Which tools an adapter exposes, resolved once at startup.
///
/// `None` means "no restriction" for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolFilter {
    groups: Option<BTreeSet<&'static str>>,
    tools: Option<BTreeSet<String>>,
}

impl ToolFilter {
    /// Filter allowing everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Parse comma-separated group and tool lists.
    ///
    /// Group names must be among `known_groups`.
    pub fn parse(
        groups: Option<&str>,
        tools: Option<&str>,
        known_groups: &[&'static str],
    ) -> Result<Self> {
        let groups = match split_list(groups) {
            None => None,
            Some(names) => {
                let mut resolved = BTreeSet::new();
                for name in names {
                    let known = known_groups
                        .iter()
                        .find(|g| g.eq_ignore_ascii_case(&name))
                        .ok_or_else(|| {
                            Error::Config(format!(
                                "Unknown tool group '{}'. Valid groups: {}",
                                name,
                                known_groups.join(", ")
                            ))
                        })?;
                    resolved.insert(*known);
                }
                Some(resolved)
            }
        };

        let tools = split_list(tools).map(|names| names.into_iter().collect());

        Ok(Self { groups, tools })
    }

    /// Whether a tool passes both the group filter and the tool allow-list.
    pub fn allows(&self, group: &str, tool: &str) -> bool {
        let group_ok = self.groups.as_ref().map_or(true, |g| g.contains(group));
        let tool_ok = self.tools.as_ref().map_or(true, |t| t.contains(tool));
        group_ok && tool_ok
    }

    /// Enabled groups, if restricted.
    pub fn groups(&self) -> Option<Vec<&'static str>> {
        self.groups.as_ref().map(|g| g.iter().copied().collect())
    }

    /// Enabled tool names, if restricted.
    pub fn tools(&self) -> Option<Vec<String>> {
        self.tools.as_ref().map(|t| t.iter().cloned().collect())
    }

    /// JSON description for config resources.
    pub fn describe(&self) -> Value {
        serde_json::json!({
            "enabled_toolgroups": self.groups().map_or(Value::String("all".into()), |g| g.into()),
            "enabled_tools": self.tools().map_or(Value::String("all".into()), |t| t.into()),
        })
    }
}

fn split_list(raw: Option<&str>) -> Option<Vec<String>> {
    let items: Vec<String> = raw?
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const GROUPS: &[&str] = &["apps", "incidents"];

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_required_missing() {
        let source = env(&[]);
        let reader = EnvReader::new(&source, "APPSIGNAL");
        let err = reader.required("API_KEY").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("APPSIGNAL_API_KEY"));
    }

    #[test]
    fn test_blank_counts_as_unset() {
        let source = env(&[("APPSIGNAL_API_KEY", "   ")]);
        let reader = EnvReader::new(&source, "APPSIGNAL");
        assert!(reader.optional("API_KEY").is_none());
        assert!(reader.required("API_KEY").is_err());
    }

    #[test]
    fn test_timeout() {
        let source = env(&[]);
        let reader = EnvReader::new(&source, "LANGFUSE");
        assert_eq!(reader.timeout().unwrap(), DEFAULT_REQUEST_TIMEOUT);

        let source = env(&[("LANGFUSE_REQUEST_TIMEOUT_SECS", "5")]);
        let reader = EnvReader::new(&source, "LANGFUSE");
        assert_eq!(reader.timeout().unwrap(), Duration::from_secs(5));

        let source = env(&[("LANGFUSE_REQUEST_TIMEOUT_SECS", "soon")]);
        let reader = EnvReader::new(&source, "LANGFUSE");
        assert!(reader.timeout().is_err());

        let source = env(&[("LANGFUSE_REQUEST_TIMEOUT_SECS", "0")]);
        let reader = EnvReader::new(&source, "LANGFUSE");
        assert!(reader.timeout().is_err());
    }

    #[test]
    fn test_filter_unset_allows_everything() {
        let filter = ToolFilter::parse(None, None, GROUPS).unwrap();
        assert_eq!(filter, ToolFilter::all());
        assert!(filter.allows("apps", "get_apps"));
        assert!(filter.allows("incidents", "anything"));
    }

    #[test]
    fn test_filter_groups() {
        let filter = ToolFilter::parse(Some(" Incidents , "), None, GROUPS).unwrap();
        assert!(filter.allows("incidents", "get_exception_incident"));
        assert!(!filter.allows("apps", "get_apps"));
        assert_eq!(filter.groups(), Some(vec!["incidents"]));
    }

    #[test]
    fn test_filter_unknown_group_is_config_error() {
        let err = ToolFilter::parse(Some("apps,bogus"), None, GROUPS).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("bogus"));
        assert!(err.to_string().contains("apps, incidents"));
    }

    #[test]
    fn test_filter_tools_and_groups_combine() {
        let filter =
            ToolFilter::parse(Some("apps"), Some("get_apps,get_exception_incident"), GROUPS)
                .unwrap();
        assert!(filter.allows("apps", "get_apps"));
        assert!(!filter.allows("apps", "select_app_id"));
        // allowed by name but its group is disabled
        assert!(!filter.allows("incidents", "get_exception_incident"));
    }

    #[test]
    fn test_filter_blank_lists_mean_all() {
        let filter = ToolFilter::parse(Some(" , "), Some(""), GROUPS).unwrap();
        assert_eq!(filter, ToolFilter::all());
    }

    #[test]
    fn test_filter_from_env() {
        let source = env(&[("APPSIGNAL_ENABLED_TOOLS", "get_apps")]);
        let reader = EnvReader::new(&source, "APPSIGNAL");
        let filter = reader.tool_filter(GROUPS).unwrap();
        assert!(filter.allows("apps", "get_apps"));
        assert!(!filter.allows("apps", "select_app_id"));
        assert_eq!(
            filter.describe(),
            serde_json::json!({"enabled_toolgroups": "all", "enabled_tools": ["get_apps"]})
        );
    }

    #[test]
    fn test_redact() {
        assert_eq!(redact(Some("secret")), Value::String(REDACTED.to_string()));
        assert_eq!(redact(Some("")), Value::Null);
        assert_eq!(redact(None), Value::Null);
    }

    #[test]
    fn test_spill_dir_is_unprefixed() {
        let source = env(&[(SPILL_DIR_VAR, "/tmp/spill")]);
        let reader = EnvReader::new(&source, "LANGFUSE");
        assert_eq!(reader.spill_dir(), Some("/tmp/spill".to_string()));
    }
}
