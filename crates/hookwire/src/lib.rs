//! # Hookwire
//!
//! Declarative, configuration-driven event wiring.
//!
//! ## Overview
//!
//! A configuration document names, by qualified type name and member name,
//! which producer events should be delivered to which consumer handler
//! methods. Hookwire resolves those names against a registry of types,
//! obtains instances from a caller-supplied resolver (or a locator function
//! named in the configuration), checks that each handler can accept its
//! event, and attaches or detaches all resulting hooks as a batch.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌────────────┐     ┌─────────────────┐
//! │ hookwire.toml│────▶│ WiringRuntime│────▶│ Dispatcher │────▶│ Hook P += C     │
//! │  (sections)  │     │ (validated)  │     │            │────▶│ Hook P += D     │
//! └──────────────┘     └──────────────┘     └────────────┘     └─────────────────┘
//!                                                 ▲
//!                                     TypeRegistry + Resolver
//! ```
//!
//! - **Runtime**: Loads configuration, sets up logging, hands out dispatchers
//! - **Registry**: Type entries declaring events, handler methods and locators
//! - **Dispatcher**: Resolves a wiring section into hooks
//! - **Hooks**: One producer event bound to one consumer handler
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hookwire::prelude::*;
//!
//! register_type!(THERMOMETER = thermometer_entry);
//! register_type!(DISPLAY = display_entry);
//!
//! fn main() -> Result<(), RuntimeError> {
//!     let runtime = WiringRuntime::builder().build()?;
//!     let registry = TypeRegistry::collect();
//!
//!     let mut dispatcher = runtime.default_dispatcher(&registry, Some(app_resolver()))?;
//!     dispatcher.attach_all();
//!     // ...
//!     dispatcher.detach_all();
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: Load TOML configuration files (default)
//! - `yaml-config`: Load YAML configuration files
//! - `json-log`: Enable the JSON log format

pub use hookwire_core as core;
pub use hookwire_runtime as runtime;

pub use hookwire_core::register_type;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use hookwire::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use hookwire_runtime::{RuntimeError, WiringRuntime};

    // Registry - declaring wireable types
    pub use hookwire_core::register_type;
    pub use hookwire_core::{FunctionDecl, TypeEntry, TypeRegistry};

    // Events and instances
    pub use hookwire_core::{EventSource, Instance, Resolver, TypeDescriptor, resolver};

    // Programmatic wiring
    pub use hookwire_core::{ConsumerRef, EventWiring, LocatorRef, ProducerRef, WiringConfig};

    // Binding
    pub use hookwire_core::{Dispatcher, DispatcherError, WiringError};
}
