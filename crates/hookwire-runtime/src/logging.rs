//! Logging setup for hookwire.
//!
//! The engine only emits events: an `info` summary per dispatcher, `debug`
//! per attached or detached hook, `warn` for skipped events and locator
//! problems and `error` for resolution failures. All of them are recorded
//! under the [`ENGINE_TARGETS`], so `engine_level` tunes the engine without
//! touching the host application's level.
//!
//! ```toml
//! [logging]
//! level = "warn"
//! engine_level = "debug"
//! filters = { "hookwire_core::framework::dispatcher" = "trace" }
//! ```
//!
//! ```rust,ignore
//! use hookwire_runtime::config::LogLevel;
//! use hookwire_runtime::logging::LoggingBuilder;
//!
//! LoggingBuilder::new()
//!     .engine_level(LogLevel::Debug)
//!     .init();
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{Subscriber, debug, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::{LogFormat, LogLevel, LogOutput, LoggingConfig};

/// Targets the engine logs under.
pub const ENGINE_TARGETS: &[&str] = &["hookwire_core", "hookwire_runtime"];

const DEFAULT_LOG_FILE: &str = "hookwire.log";

/// Initialize logging from a `LoggingConfig`.
///
/// Keeps the existing global subscriber if one is installed.
pub fn init_from_config(config: &LoggingConfig) {
    if let Err(err) = LoggingBuilder::from_config(config).try_init() {
        debug!(error = %err, "Global subscriber already installed, logging configuration ignored");
    }
}

// =============================================================================
// LoggingBuilder
// =============================================================================

/// Builds the global subscriber from a [`LoggingConfig`] plus extra
/// filter directives.
#[derive(Debug, Default)]
pub struct LoggingBuilder {
    config: LoggingConfig,
    directives: Vec<String>,
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            config: config.clone(),
            directives: Vec::new(),
        }
    }

    /// Set the base level, used when `RUST_LOG` is unset.
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Set the level of the [`ENGINE_TARGETS`].
    pub fn engine_level(mut self, level: LogLevel) -> Self {
        self.config.engine_level = Some(level);
        self
    }

    /// Add a raw filter directive, e.g. `"hookwire_core::framework=trace"`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Write to the given file instead of stdout.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output = LogOutput::File;
        self.config.file_path = Some(path.into());
        self
    }

    /// Filter directives layered over the base level, in application order.
    ///
    /// Engine targets come first so the per-module `filters` and explicit
    /// directives can narrow them further.
    pub fn directives(&self) -> Vec<String> {
        let engine = self.config.engine_level.into_iter().flat_map(|level| {
            ENGINE_TARGETS
                .iter()
                .map(move |target| format!("{target}={level}"))
        });
        let filters = self
            .config
            .filters
            .iter()
            .map(|(module, level)| format!("{module}={level}"));

        engine
            .chain(filters)
            .chain(self.directives.iter().cloned())
            .collect()
    }

    fn build_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.config.level.as_str()));

        for directive in self.directives() {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(err) => warn!(directive = %directive, error = %err, "Ignoring invalid log directive"),
            }
        }

        filter
    }

    fn writer(&self) -> BoxMakeWriter {
        match (self.config.output, &self.config.file_path) {
            (LogOutput::Stdout, _) => BoxMakeWriter::new(std::io::stdout),
            (LogOutput::Stderr, _) => BoxMakeWriter::new(std::io::stderr),
            (LogOutput::File, Some(path)) => BoxMakeWriter::new(tracing_appender::rolling::never(
                path.parent().unwrap_or_else(|| Path::new(".")),
                path.file_name()
                    .unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE)),
            )),
            (LogOutput::File, None) => {
                warn!("File output requested but no file path configured, falling back to stdout");
                BoxMakeWriter::new(std::io::stdout)
            }
        }
    }

    fn layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync + 'static>
    where
        S: Subscriber + for<'a> LookupSpan<'a> + 'static,
    {
        let location = self.config.file_location;
        let layer = fmt::layer()
            .with_writer(self.writer())
            .with_thread_ids(self.config.thread_ids)
            .with_file(location)
            .with_line_number(location);

        match self.config.format {
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Full => layer.boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
            #[cfg(feature = "json-log")]
            LogFormat::Json => layer.json().boxed(),
            #[cfg(not(feature = "json-log"))]
            LogFormat::Json => {
                warn!("JSON log format requires the json-log feature, using full format");
                layer.boxed()
            }
        }
    }

    /// Initialize the logging system, ignoring an existing subscriber.
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Install the subscriber, failing if one is already set.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.build_filter();
        tracing_subscriber::registry()
            .with(self.layer())
            .with(filter)
            .try_init()
    }
}
