//! Framework layer - resolution and binding.
//!
//! This module turns a wiring configuration into live bindings:
//! - Error policy deciding between skipping and aborting
//! - Member resolution pipeline for producer and consumer references
//! - Locator synthesis for configurations without a caller resolver
//! - Hooks performing attach and detach
//! - The dispatcher owning the hooks of one configuration

pub mod dispatcher;
pub mod hook;
pub mod locator;
pub mod pipeline;
pub mod policy;

pub use dispatcher::{BatchOutcome, Dispatcher, DispatcherStats};
pub use hook::{Hook, HookState};
pub use locator::synthesize_resolver;
pub use pipeline::{ResolvedMember, resolve_consumer, resolve_producer};
pub use policy::Policy;
