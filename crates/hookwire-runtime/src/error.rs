//! Runtime error types.

use hookwire_core::DispatcherError;
use thiserror::Error;

pub use crate::config::{ConfigError, ConfigResult};

/// Errors that can occur while building dispatchers from configuration.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A strict wiring section failed to resolve.
    #[error("Wiring failed: {0}")]
    Dispatcher(#[from] DispatcherError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
