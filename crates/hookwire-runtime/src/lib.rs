//! Hookwire Runtime - configuration and logging around the wiring engine.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`) with profiles and
//!   environment overrides
//! - Validation of wiring sections before they reach the dispatcher
//! - Logging configuration
//! - The `WiringRuntime` entry point
//!
//! # Configuration File
//!
//! ```toml
//! [logging]
//! level = "info"
//!
//! [eventConfig]
//! throwOnErrors = false
//! locator = { qualifiedClassName = "app.ServiceLocator", methodName = "Resolve" }
//!
//! [[eventConfig.events]]
//! producer = { qualifiedClassName = "app.Thermometer", eventName = "Changed" }
//! consumers = [
//!     { qualifiedClassName = "app.Display", methodName = "OnChanged" },
//!     { qualifiedClassName = "app.Recorder" },
//! ]
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use hookwire_core::TypeRegistry;
//! use hookwire_runtime::WiringRuntime;
//!
//! let runtime = WiringRuntime::builder().profile("production").build()?;
//! let mut dispatcher = runtime.default_dispatcher(&TypeRegistry::collect(), None)?;
//!
//! dispatcher.attach_all();
//! // ...
//! dispatcher.detach_all();
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, DEFAULT_SECTION_NAME, HookwireConfig, LogFormat,
    LogLevel, LogOutput, LoggingConfig, Profile,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use runtime::{RuntimeBuilder, WiringRuntime};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, event, info, instrument, span, trace, warn};
}
