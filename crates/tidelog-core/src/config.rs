//! Logger configuration and the properties source it is loaded from.
//!
//! A properties file is a flat list of `key=value`, `key: value` or
//! `key value` entries. `#` and `!` start comment lines, and a trailing `\`
//! continues the value on the next line. Other backslash escapes are kept
//! as written.
//!
//! ```text
//! # resources/logger.properties
//! log_queue_size=1000
//! log_lifetime_seconds=60
//! log_location=logs/
//! tracing=false
//! ```
//!
//! Keys the logger does not know about are kept, so other components (the
//! stress harness, for one) can read their own settings from the same source.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::error::{LogError, LogResult};

/// Where the properties source is expected when no path is given.
pub const DEFAULT_PROPERTIES_PATH: &str = "resources/logger.properties";

/// Property key: maximum number of buffered lines.
pub const KEY_QUEUE_SIZE: &str = "log_queue_size";
/// Property key: maximum file lifetime in seconds.
pub const KEY_LIFETIME_SECONDS: &str = "log_lifetime_seconds";
/// Property key: directory receiving the log files.
pub const KEY_LOCATION: &str = "log_location";
/// Property key: self-diagnostic output.
pub const KEY_TRACING: &str = "tracing";

/// Raw key/value pairs read from a properties source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Read and parse a properties file.
    pub fn load(path: impl AsRef<Path>) -> LogResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LogError::Config(format!(
                "Properties file {} expected but not found",
                path.display()
            )),
            _ => LogError::Config(format!(
                "Properties file {} cannot be accessed for read: {}",
                path.display(),
                e
            )),
        })?;
        Ok(Self::parse(&text))
    }

    /// Parse properties text. Later duplicates win.
    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();
        let mut lines = text.lines();
        while let Some(first) = lines.next() {
            let first = first.trim_start();
            if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
                continue;
            }

            let mut logical = first.to_string();
            while ends_with_continuation(&logical) {
                logical.pop();
                match lines.next() {
                    Some(next) => logical.push_str(next.trim_start()),
                    None => break,
                }
            }

            let (key, value) = split_entry(&logical);
            entries.insert(key.to_string(), value.trim_end().to_string());
        }
        Self { entries }
    }

    /// Raw value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Insert or replace a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Parse a required value, mapping absence and parse failures to config errors.
    pub fn get_parsed<T>(&self, key: &str) -> LogResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self
            .get(key)
            .ok_or_else(|| LogError::Config(format!("property {} is missing", key)))?;
        raw.parse::<T>()
            .map_err(|e| LogError::Config(format!("property {} has invalid value '{}': {}", key, raw, e)))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries were parsed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An odd number of trailing backslashes joins the next line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Key ends at the first `=`, `:` or whitespace; one separator is skipped.
fn split_entry(line: &str) -> (&str, &str) {
    let key_end = line
        .find(|c: char| c == '=' || c == ':' || c.is_whitespace())
        .unwrap_or(line.len());
    let rest = line[key_end..].trim_start();
    let rest = rest.strip_prefix(['=', ':']).unwrap_or(rest);
    (&line[..key_end], rest.trim_start())
}

/// Validated, immutable logger parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggerConfig {
    queue_capacity: usize,
    rotation_interval_millis: u64,
    output_dir: PathBuf,
    tracing: bool,
}

impl LoggerConfig {
    /// Build a config, rejecting out-of-range values.
    ///
    /// * `queue_capacity` must be at least 1
    /// * `rotation_interval_secs` must be at least 1
    /// * `output_dir` must not be empty
    pub fn new(
        queue_capacity: i64,
        rotation_interval_secs: i64,
        output_dir: impl Into<PathBuf>,
        tracing: bool,
    ) -> LogResult<Self> {
        if queue_capacity < 1 {
            return Err(LogError::Config(format!(
                "property {} must be 1 or greater",
                KEY_QUEUE_SIZE
            )));
        }
        if rotation_interval_secs < 1 {
            return Err(LogError::Config(format!(
                "property {} must be 1 or greater",
                KEY_LIFETIME_SECONDS
            )));
        }
        let rotation_interval_millis = u64::try_from(rotation_interval_secs)
            .ok()
            .and_then(|secs| secs.checked_mul(1000))
            .ok_or_else(|| {
                LogError::Config(format!("property {} is out of range", KEY_LIFETIME_SECONDS))
            })?;
        let queue_capacity = usize::try_from(queue_capacity).map_err(|_| {
            LogError::Config(format!("property {} is out of range", KEY_QUEUE_SIZE))
        })?;
        let output_dir = output_dir.into();
        if output_dir.as_os_str().is_empty() {
            return Err(LogError::Config(format!(
                "property {} must not be empty",
                KEY_LOCATION
            )));
        }

        Ok(Self {
            queue_capacity,
            rotation_interval_millis,
            output_dir,
            tracing,
        })
    }

    /// Resolve the logger's keys from a properties source.
    pub fn from_properties(props: &Properties) -> LogResult<Self> {
        let queue_capacity = props.get_parsed::<i64>(KEY_QUEUE_SIZE)?;
        let lifetime_secs = props.get_parsed::<i64>(KEY_LIFETIME_SECONDS)?;
        let location = props.get(KEY_LOCATION).unwrap_or_default();
        let tracing = props
            .get(KEY_TRACING)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self::new(queue_capacity, lifetime_secs, location, tracing)
    }

    /// Load a properties file and resolve the logger's keys from it.
    pub fn load(path: impl AsRef<Path>) -> LogResult<(Self, Properties)> {
        let props = Properties::load(path)?;
        let config = Self::from_properties(&props)?;
        Ok((config, props))
    }

    /// Maximum number of buffered lines.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Maximum lifetime of one log file.
    pub fn rotation_interval(&self) -> Duration {
        Duration::from_millis(self.rotation_interval_millis)
    }

    /// Directory receiving the log files.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Whether self-diagnostic output is enabled.
    pub fn tracing(&self) -> bool {
        self.tracing
    }
}
