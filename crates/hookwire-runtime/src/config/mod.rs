//! Configuration module for the hookwire runtime.
//!
//! This module provides figment-based loading and validation of wiring
//! sections and logging options.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    DEFAULT_SECTION_NAME, HookwireConfig, LogFormat, LogLevel, LogOutput, LoggingConfig,
};
pub use validation::{validate_config, validate_wiring};
