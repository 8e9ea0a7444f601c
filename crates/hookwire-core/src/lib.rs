//! # Hookwire Core
//!
//! Declarative event wiring resolved at run time.
//!
//! A [`WiringConfig`] names producer events and consumer handler methods by
//! qualified type name and member name. The [`Dispatcher`] looks those names
//! up in a [`TypeRegistry`], obtains instances from a [`Resolver`], checks
//! that each consumer can handle its producer's event and builds one
//! [`Hook`] per pair. The hooks are then attached and detached as a batch.
//!
//! ## Architecture Layers
//!
//! ### Foundation Layer
//!
//! - **Type identities**: [`TypeDescriptor`], [`Instance`], [`Resolver`]
//! - **Events**: [`EventSource`] and the canonical [`EventHandler`] shape
//!
//! ### Registry Layer
//!
//! - **Type entries**: [`TypeEntry`] built with a typed builder
//! - **Registry**: [`TypeRegistry`], explicit or collected through [`register_type!`]
//!
//! ### Framework Layer
//!
//! - **Pipeline**: [`resolve_producer`], [`resolve_consumer`]
//! - **Locator**: [`synthesize_resolver`]
//! - **Binding**: [`Hook`], [`Dispatcher`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::any::Any;
//! use std::sync::Arc;
//!
//! use hookwire_core::prelude::*;
//!
//! pub struct Thermometer {
//!     pub changed: EventSource<f64>,
//! }
//!
//! pub struct Display;
//!
//! impl Display {
//!     fn show(&self, value: f64) {
//!         println!("{value}");
//!     }
//! }
//!
//! let registry = TypeRegistry::builder()
//!     .register(
//!         TypeEntry::builder::<Thermometer>("app.Thermometer")
//!             .event("Changed", |t: &Thermometer| &t.changed)
//!             .build(),
//!     )
//!     .register(
//!         TypeEntry::builder::<Display>("app.Display")
//!             .handler("OnChanged", |d: &Display, _: Option<&dyn Any>, v: &f64| d.show(*v))
//!             .build(),
//!     )
//!     .build();
//!
//! let config = WiringConfig::new().event(
//!     EventWiring::new(ProducerRef::new("app.Thermometer", "Changed"))
//!         .consumer(ConsumerRef::new("app.Display", "OnChanged"))?,
//! )?;
//!
//! let thermometer = Arc::new(Thermometer { changed: EventSource::new() });
//! let display = Arc::new(Display);
//! let resolver = {
//!     let (t, d): (Instance, Instance) = (thermometer.clone(), display);
//!     resolver(move |ty| {
//!         if ty.is::<Thermometer>() { Some(t.clone()) } else { Some(d.clone()) }
//!     })
//! };
//!
//! let mut dispatcher = Dispatcher::new(&config, &registry, Some(resolver))?;
//! dispatcher.attach_all();
//! thermometer.changed.raise(None, &21.5);
//! dispatcher.detach_all();
//! ```

// Architectural layers
pub mod config;
pub mod error;
pub mod foundation;
pub mod framework;
pub mod registry;

// Used by `register_type!`.
pub use linkme;

pub use config::{
    AUTOWIRED_METHOD_NAME, ConsumerRef, EventWiring, LocatorRef, ProducerRef, WiringConfig,
};
pub use error::{
    DispatcherError, DispatcherResult, MemberError, Role, WiringError, WiringResult,
};
pub use foundation::{
    ArgShape, EventHandler, EventSource, Instance, Resolver, TypeDescriptor, resolver,
};
pub use framework::{
    BatchOutcome, Dispatcher, DispatcherStats, Hook, HookState, Policy, ResolvedMember,
    resolve_consumer, resolve_producer, synthesize_resolver,
};
pub use registry::{
    EventMember, FunctionDecl, FunctionMember, FunctionSignature, HandlerMethod, Member,
    REGISTERED_TYPES, TypeEntry, TypeEntryBuilder, TypeRegistry, TypeRegistryBuilder, ValueKind,
    Visibility,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::config::{ConsumerRef, EventWiring, LocatorRef, ProducerRef, WiringConfig};
    pub use super::error::{DispatcherError, WiringError};
    pub use super::foundation::*;
    pub use super::framework::{BatchOutcome, Dispatcher, DispatcherStats};
    pub use super::register_type;
    pub use super::registry::{FunctionDecl, Member, TypeEntry, TypeRegistry};
}
