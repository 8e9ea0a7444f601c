//! Configuration schema definitions.
//!
//! The root document holds a `logging` table and any number of named wiring
//! sections. Every other top-level table is a [`WiringConfig`]:
//!
//! ```toml
//! [logging]
//! level = "debug"
//! format = "pretty"
//!
//! [eventConfig]
//! throwOnErrors = true
//!
//! [[eventConfig.events]]
//! producer = { qualifiedClassName = "app.Thermometer", eventName = "Changed" }
//! consumers = [{ qualifiedClassName = "app.Display", methodName = "OnChanged" }]
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use hookwire_core::WiringConfig;
use serde::{Deserialize, Serialize};

/// Name of the wiring section used when none is given.
pub const DEFAULT_SECTION_NAME: &str = "eventConfig";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookwireConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Wiring sections by name.
    #[serde(flatten)]
    pub sections: BTreeMap<String, WiringConfig>,
}

impl HookwireConfig {
    /// Looks up a wiring section.
    pub fn section(&self, name: &str) -> Option<&WiringConfig> {
        self.sections.get(name)
    }

    /// The `eventConfig` section.
    pub fn default_section(&self) -> Option<&WiringConfig> {
        self.section(DEFAULT_SECTION_NAME)
    }

    /// Adds or replaces a wiring section.
    pub fn with_section(mut self, name: impl Into<String>, section: WiringConfig) -> Self {
        self.sections.insert(name.into(), section);
        self
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global log level.
    pub level: LogLevel,

    /// Level for the hookwire crates, when it differs from `level`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_level: Option<LogLevel>,

    /// Output format.
    pub format: LogFormat,

    /// Output destination.
    pub output: LogOutput,

    /// Log file, required when `output` is `file`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,

    /// Include thread IDs.
    pub thread_ids: bool,

    /// Include file names and line numbers.
    pub file_location: bool,

    /// Per-module levels, e.g. `hookwire_core = "debug"`.
    pub filters: BTreeMap<String, LogLevel>,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level name as used in filter directives.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to `full` otherwise.
    Json,
}

/// Log output destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}
