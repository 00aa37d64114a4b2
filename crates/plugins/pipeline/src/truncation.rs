//! Large-field truncation with spill files.
//!
//! Walks a JSON value and replaces every string longer than the threshold
//! with a preview plus the path of a side file holding the full text:
//!
//! ```text
//! <first 1000 chars>... [truncated: 1500 chars total, full content saved to /tmp/toolbelt-truncated/000001-9f2c4a1b-input.txt]
//! ```
//!
//! Lengths are counted in characters, not bytes. Object key order, array
//! order and non-string values are left untouched.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value};
use toolbelt_core::Result;
use tracing::debug;

/// Default maximum characters kept inline.
pub const DEFAULT_THRESHOLD: usize = 1000;

/// Directory name used under the system temp dir.
pub const SPILL_DIR_NAME: &str = "toolbelt-truncated";

/// Maximum length of the path hint in spill file names.
const MAX_HINT_CHARS: usize = 50;

/// Per-process spill file counter.
static SPILL_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Default spill directory: `<tmp>/toolbelt-truncated`.
pub fn default_spill_dir() -> PathBuf {
    std::env::temp_dir().join(SPILL_DIR_NAME)
}

/// Truncates oversized string fields, spilling full values to disk.
#[derive(Debug, Clone)]
pub struct Truncator {
    threshold: usize,
    spill_dir: PathBuf,
}

impl Truncator {
    /// Create a truncator with the default threshold.
    pub fn new(spill_dir: impl Into<PathBuf>) -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            spill_dir: spill_dir.into(),
        }
    }

    /// Override the character threshold.
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn spill_dir(&self) -> &Path {
        &self.spill_dir
    }

    /// Truncate every long string inside `value`.
    ///
    /// Spill file write failures are returned, not swallowed.
    pub fn truncate(&self, value: Value) -> Result<Value> {
        self.walk(value, "")
    }

    fn walk(&self, value: Value, path: &str) -> Result<Value> {
        match value {
            Value::String(s) => self.truncate_text(s, path).map(Value::String),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| self.walk(item, &format!("{}[{}]", path, i)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Object(fields) => {
                let mut out = Map::with_capacity(fields.len());
                for (key, item) in fields {
                    let child = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", path, key)
                    };
                    let item = self.walk(item, &child)?;
                    out.insert(key, item);
                }
                Ok(Value::Object(out))
            }
            other => Ok(other),
        }
    }

    /// Truncate a single string; `hint` names the field in the spill file.
    pub fn truncate_text(&self, text: String, hint: &str) -> Result<String> {
        // byte length bounds the char count from above
        if text.len() <= self.threshold {
            return Ok(text);
        }
        let total = text.chars().count();
        if total <= self.threshold {
            return Ok(text);
        }

        let preview: String = text.chars().take(self.threshold).collect();
        let path = self.spill(&text, hint)?;

        Ok(format!(
            "{}... [truncated: {} chars total, full content saved to {}]",
            preview,
            total,
            path.display()
        ))
    }

    /// Spill file path named by a string this truncator produced.
    ///
    /// The marker is read at its fixed position right after the preview,
    /// so marker-like text in the preview or in the spill directory does
    /// not confuse the parse.
    pub fn spill_path(&self, truncated: &str) -> Option<PathBuf> {
        let (preview_end, _) = truncated.char_indices().nth(self.threshold)?;
        let marker = truncated[preview_end..].strip_prefix("... [truncated: ")?;
        let (_, path) = marker.split_once(" chars total, full content saved to ")?;
        path.strip_suffix(']').map(PathBuf::from)
    }

    fn spill(&self, text: &str, hint: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.spill_dir)?;

        let counter = SPILL_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
        let random = uuid::Uuid::new_v4().simple().to_string();
        let name = format!(
            "{:06}-{}-{}.txt",
            counter,
            &random[..8],
            sanitize_hint(hint)
        );
        let path = self.spill_dir.join(name);

        std::fs::write(&path, text)?;
        debug!(path = %path.display(), chars = text.chars().count(), "Spilled long field");

        Ok(path)
    }
}

impl Default for Truncator {
    fn default() -> Self {
        Self::new(default_spill_dir())
    }
}

/// Reduce a field path to a safe file name fragment.
pub fn sanitize_hint(hint: &str) -> String {
    let cleaned: String = hint
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_HINT_CHARS)
        .collect();

    if cleaned.is_empty() {
        "value".to_string()
    } else {
        cleaned
    }
}
