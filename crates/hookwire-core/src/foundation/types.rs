//! Type descriptors, erased instances and the instance resolver contract.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A type-erased, shared reference to a producer or consumer object.
///
/// The engine never owns the lifetime of these objects; it only keeps the
/// references handed out by the resolver for as long as a hook needs them.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Maps a type descriptor to an instance, or `None` for "no instance".
///
/// Supplied by the embedding application or synthesized from a configured
/// locator function. The engine never calls it concurrently.
pub type Resolver = Arc<dyn Fn(&TypeDescriptor) -> Option<Instance> + Send + Sync>;

/// Wraps a closure into a [`Resolver`].
pub fn resolver<F>(f: F) -> Resolver
where
    F: Fn(&TypeDescriptor) -> Option<Instance> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Runtime identity of a registered type.
///
/// Pairs the externally visible qualified name with the Rust [`TypeId`] of
/// the backing type, so resolved instances can be checked against it.
#[derive(Clone)]
pub struct TypeDescriptor {
    name: Arc<str>,
    type_id: TypeId,
    rust_name: &'static str,
}

impl TypeDescriptor {
    /// Creates the descriptor of `T` registered under `name`.
    pub fn of<T: Any>(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            type_id: TypeId::of::<T>(),
            rust_name: std::any::type_name::<T>(),
        }
    }

    /// The qualified name used in wiring configuration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The [`TypeId`] of the backing Rust type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The Rust type name of the backing type, for diagnostics.
    pub fn rust_name(&self) -> &'static str {
        self.rust_name
    }

    /// Returns `true` if the descriptor was created for `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Returns `true` if `instance` is an object of this type.
    pub fn matches(&self, instance: &Instance) -> bool {
        Any::type_id(&**instance) == self.type_id
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.type_id.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("rust_name", &self.rust_name)
            .finish()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
