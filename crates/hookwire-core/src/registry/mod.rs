//! Type registry serving symbolic lookup of producer and consumer members.
//!
//! Types become visible to wiring configuration in one of two ways:
//!
//! - explicitly, through [`TypeRegistryBuilder::register`]
//! - at link time, by contributing a factory to [`REGISTERED_TYPES`] with
//!   the [`register_type!`](crate::register_type) macro
//!
//! # Example
//!
//! ```rust,ignore
//! use hookwire_core::{TypeEntry, TypeRegistry, register_type};
//!
//! fn thermometer_entry() -> TypeEntry {
//!     TypeEntry::builder::<Thermometer>("sensors.Thermometer")
//!         .event("Changed", |t: &Thermometer| &t.changed)
//!         .build()
//! }
//!
//! register_type!(THERMOMETER = thermometer_entry);
//!
//! let registry = TypeRegistry::collect();
//! assert!(registry.get("sensors.Thermometer").is_some());
//! ```

pub mod entry;
pub mod member;

use std::collections::HashMap;
use std::sync::Arc;

use linkme::distributed_slice;
use tracing::{trace, warn};

pub use entry::{TypeEntry, TypeEntryBuilder};
pub use member::{
    EventMember, FunctionDecl, FunctionMember, FunctionSignature, HandlerMethod, Member,
    ValueKind, Visibility,
};

// =============================================================================
// Link-time Registration (linkme distributed slice)
// =============================================================================

/// Factories of type entries contributed at link time.
///
/// Use [`register_type!`](crate::register_type) rather than adding entries by hand.
#[distributed_slice]
pub static REGISTERED_TYPES: [fn() -> TypeEntry];

/// Contributes a type entry factory to [`REGISTERED_TYPES`].
///
/// ```rust,ignore
/// register_type!(DISPLAY = display_entry);
/// ```
#[macro_export]
macro_rules! register_type {
    ($name:ident = $factory:path) => {
        #[$crate::linkme::distributed_slice($crate::registry::REGISTERED_TYPES)]
        #[linkme(crate = $crate::linkme)]
        static $name: fn() -> $crate::registry::TypeEntry = $factory;
    };
}

// =============================================================================
// Registry
// =============================================================================

/// Map from qualified type name to its registered entry.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<TypeEntry>>,
}

impl TypeRegistry {
    /// Starts an empty registry.
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// Builds a registry from every link-time registered type.
    pub fn collect() -> Self {
        Self::builder().with_registered().build()
    }

    /// Looks up a type by qualified name.
    pub fn get(&self, name: &str) -> Option<&Arc<TypeEntry>> {
        self.types.get(name)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no type is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Builder for [`TypeRegistry`].
#[derive(Default)]
pub struct TypeRegistryBuilder {
    types: HashMap<String, Arc<TypeEntry>>,
}

impl TypeRegistryBuilder {
    /// Registers an entry. A later entry with the same name replaces the earlier one.
    pub fn register(mut self, entry: TypeEntry) -> Self {
        let name = entry.name().to_string();
        trace!(type_name = %name, "Registering type");
        if self.types.insert(name.clone(), Arc::new(entry)).is_some() {
            warn!(type_name = %name, "Type registered twice; the last registration wins");
        }
        self
    }

    /// Registers every entry contributed through [`REGISTERED_TYPES`].
    pub fn with_registered(mut self) -> Self {
        for factory in REGISTERED_TYPES {
            self = self.register(factory());
        }
        self
    }

    /// Finishes the registry.
    pub fn build(self) -> TypeRegistry {
        TypeRegistry { types: self.types }
    }
}
