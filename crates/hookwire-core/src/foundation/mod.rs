//! Foundation layer: type identities, erased instances and event sources.

pub mod event;
pub mod types;

pub use event::{ArgShape, EventHandler, EventSource};
pub use types::{Instance, Resolver, TypeDescriptor, resolver};
