//! Runtime entry point.
//!
//! [`WiringRuntime`] holds a loaded, validated [`HookwireConfig`] and builds
//! a [`Dispatcher`] for any of its wiring sections.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use hookwire_runtime::WiringRuntime;
//! use hookwire_core::TypeRegistry;
//!
//! // Loads hookwire.toml from the current directory and sets up logging
//! let runtime = WiringRuntime::builder().build()?;
//!
//! let registry = TypeRegistry::collect();
//! let mut dispatcher = runtime.default_dispatcher(&registry, Some(resolver))?;
//! dispatcher.attach_all();
//! ```

use std::path::Path;

use hookwire_core::{Dispatcher, Resolver, TypeRegistry};
use tracing::{Level, info, span};

use crate::config::{
    ConfigError, ConfigLoader, DEFAULT_SECTION_NAME, HookwireConfig, validate_config,
};
use crate::error::RuntimeResult;
use crate::logging;

/// A validated configuration ready to build dispatchers.
#[derive(Debug, Clone)]
pub struct WiringRuntime {
    config: HookwireConfig,
}

impl WiringRuntime {
    /// Creates a runtime builder for custom configuration.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let runtime = WiringRuntime::builder()
    ///     .config_file("config/hookwire.toml")
    ///     .profile("production")
    ///     .build()?;
    /// ```
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already loaded configuration.
    ///
    /// Logging is left untouched; see [`logging::init_from_config`].
    pub fn from_config(config: HookwireConfig) -> RuntimeResult<Self> {
        validate_config(&config)?;
        info!(
            sections = config.sections.len(),
            log_level = %config.logging.level,
            "Runtime initialized from configuration"
        );
        Ok(Self { config })
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &HookwireConfig {
        &self.config
    }

    /// Names of the wiring sections, sorted.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.config.sections.keys().map(String::as_str)
    }

    /// Builds the dispatcher of the named wiring section.
    pub fn dispatcher(
        &self,
        section: &str,
        registry: &TypeRegistry,
        resolver: Option<Resolver>,
    ) -> RuntimeResult<Dispatcher> {
        let span = span!(Level::INFO, "section", name = section);
        let _enter = span.enter();

        let wiring = self
            .config
            .section(section)
            .ok_or_else(|| ConfigError::SectionNotFound(section.to_string()))?;
        Ok(Dispatcher::new(wiring, registry, resolver)?)
    }

    /// Builds the dispatcher of the `eventConfig` section.
    pub fn default_dispatcher(
        &self,
        registry: &TypeRegistry,
        resolver: Option<Resolver>,
    ) -> RuntimeResult<Dispatcher> {
        self.dispatcher(DEFAULT_SECTION_NAME, registry, resolver)
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a `WiringRuntime` with custom configuration.
///
/// Logging is initialized from the loaded configuration unless disabled
/// with [`with_logging(false)`](Self::with_logging).
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    init_logging: bool,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder searching the current directory.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            init_logging: true,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables loading environment variables (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: HookwireConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Whether to initialize logging from the loaded configuration.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.init_logging = enabled;
        self
    }

    /// Loads, validates and builds the runtime.
    pub fn build(self) -> RuntimeResult<WiringRuntime> {
        let config = self.config_loader.load()?;
        if self.init_logging {
            logging::init_from_config(&config.logging);
        }
        WiringRuntime::from_config(config)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
