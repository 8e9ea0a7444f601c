//! Member handles returned by registry lookups.
//!
//! Each handle is an opaque, shared description of one member of a
//! registered type together with the erased closures that operate on it.
//! Handles are created by [`TypeEntryBuilder`](super::TypeEntryBuilder).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::MemberError;
use crate::foundation::{ArgShape, EventHandler, Instance, Resolver, TypeDescriptor};

/// Whether a member is visible to symbolic lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Visible to configuration.
    #[default]
    Public,
    /// Registered for completeness but never resolved from configuration.
    Private,
}

/// Common view over every member kind.
pub trait Member {
    /// The member name as used in configuration.
    fn name(&self) -> &str;

    /// The type declaring this member.
    fn declaring_type(&self) -> &TypeDescriptor;

    /// Whether the member is static (needs no instance).
    fn is_static(&self) -> bool;

    /// The member's visibility.
    fn visibility(&self) -> Visibility;

    /// `type.member`, used in logs and errors.
    fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_type().name(), self.name())
    }
}

// =============================================================================
// Events
// =============================================================================

pub(crate) type SubscribeFn =
    Arc<dyn Fn(Option<&Instance>, &EventHandler) -> Result<(), MemberError> + Send + Sync>;

/// An event exposed by a registered producer type.
pub struct EventMember {
    pub(crate) declaring_type: TypeDescriptor,
    pub(crate) name: String,
    pub(crate) is_static: bool,
    pub(crate) visibility: Visibility,
    pub(crate) args: ArgShape,
    pub(crate) add: SubscribeFn,
    pub(crate) remove: SubscribeFn,
}

impl EventMember {
    /// The argument shape this event raises.
    pub fn args(&self) -> ArgShape {
        self.args
    }

    /// Subscribes `handler` to this event on `instance`.
    pub fn subscribe(
        &self,
        instance: Option<&Instance>,
        handler: &EventHandler,
    ) -> Result<(), MemberError> {
        (self.add)(instance, handler)
    }

    /// Removes `handler` from this event on `instance`.
    pub fn unsubscribe(
        &self,
        instance: Option<&Instance>,
        handler: &EventHandler,
    ) -> Result<(), MemberError> {
        (self.remove)(instance, handler)
    }
}

impl Member for EventMember {
    fn name(&self) -> &str {
        &self.name
    }

    fn declaring_type(&self) -> &TypeDescriptor {
        &self.declaring_type
    }

    fn is_static(&self) -> bool {
        self.is_static
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }
}

impl fmt::Debug for EventMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventMember")
            .field("name", &self.qualified_name())
            .field("is_static", &self.is_static)
            .field("args", &self.args)
            .finish()
    }
}

// =============================================================================
// Handler Methods
// =============================================================================

pub(crate) type InvokeFn = Arc<dyn Fn(Option<&Instance>, Option<&dyn Any>, &dyn Any) + Send + Sync>;

/// A method of a registered consumer type that can handle events.
pub struct HandlerMethod {
    pub(crate) declaring_type: TypeDescriptor,
    pub(crate) name: String,
    pub(crate) is_static: bool,
    pub(crate) visibility: Visibility,
    pub(crate) args: ArgShape,
    pub(crate) invoke: InvokeFn,
}

impl HandlerMethod {
    /// The argument shape this method accepts.
    pub fn args(&self) -> ArgShape {
        self.args
    }

    /// Binds the method to `instance`, producing a callable of the canonical shape.
    ///
    /// No checks are made here; use [`Hook`](crate::Hook) construction for a
    /// verified binding.
    pub fn bind(&self, instance: Option<Instance>) -> EventHandler {
        let invoke = Arc::clone(&self.invoke);
        Arc::new(move |sender: Option<&dyn Any>, args: &dyn Any| {
            invoke(instance.as_ref(), sender, args)
        })
    }
}

impl Member for HandlerMethod {
    fn name(&self) -> &str {
        &self.name
    }

    fn declaring_type(&self) -> &TypeDescriptor {
        &self.declaring_type
    }

    fn is_static(&self) -> bool {
        self.is_static
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }
}

impl fmt::Debug for HandlerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerMethod")
            .field("name", &self.qualified_name())
            .field("is_static", &self.is_static)
            .field("args", &self.args)
            .finish()
    }
}

// =============================================================================
// Functions
// =============================================================================

/// The kind of a function parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// No value.
    Unit,
    /// A [`TypeDescriptor`].
    TypeDescriptor,
    /// An [`Instance`] or nothing.
    Instance,
    /// Any other value, named for diagnostics.
    Other(&'static str),
}

/// The declared parameter and return kinds of a function member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    params: Vec<ValueKind>,
    returns: ValueKind,
}

impl FunctionSignature {
    /// Creates a signature.
    pub fn new(params: impl Into<Vec<ValueKind>>, returns: ValueKind) -> Self {
        Self {
            params: params.into(),
            returns,
        }
    }

    /// The `(TypeDescriptor) -> Instance` shape required of locators.
    pub fn locator() -> Self {
        Self::new([ValueKind::TypeDescriptor], ValueKind::Instance)
    }

    /// Returns `true` if this is the locator shape.
    pub fn is_locator(&self) -> bool {
        *self == Self::locator()
    }

    /// Parameter kinds in order.
    pub fn params(&self) -> &[ValueKind] {
        &self.params
    }

    /// Return kind.
    pub fn returns(&self) -> ValueKind {
        self.returns
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| format!("{p:?}")).collect();
        write!(f, "fn({}) -> {:?}", params.join(", "), self.returns)
    }
}

/// Declaration of a function member, consumed by
/// [`TypeEntryBuilder::function`](super::TypeEntryBuilder::function).
pub struct FunctionDecl {
    pub(crate) is_static: bool,
    pub(crate) visibility: Visibility,
    pub(crate) signature: FunctionSignature,
    pub(crate) body: Arc<dyn Any + Send + Sync>,
}

impl FunctionDecl {
    /// A public static function with the given signature and body.
    ///
    /// The body must be the callable type matching the signature (a
    /// [`Resolver`] for the locator shape) or it will be rejected on use.
    pub fn new(signature: FunctionSignature, body: impl Any + Send + Sync) -> Self {
        Self {
            is_static: true,
            visibility: Visibility::Public,
            signature,
            body: Arc::new(body),
        }
    }

    /// A public static locator function.
    pub fn locator<F>(f: F) -> Self
    where
        F: Fn(&TypeDescriptor) -> Option<Instance> + Send + Sync + 'static,
    {
        let body: Resolver = Arc::new(f);
        Self::new(FunctionSignature::locator(), body)
    }

    /// Marks the function as private.
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Marks the function as an instance function.
    pub fn instance(mut self) -> Self {
        self.is_static = false;
        self
    }
}

/// A non-handler function of a registered type, such as a locator.
pub struct FunctionMember {
    pub(crate) declaring_type: TypeDescriptor,
    pub(crate) name: String,
    pub(crate) is_static: bool,
    pub(crate) visibility: Visibility,
    pub(crate) signature: FunctionSignature,
    pub(crate) body: Arc<dyn Any + Send + Sync>,
}

impl FunctionMember {
    /// The declared signature.
    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    /// Returns the body as a resolver when it really is one.
    pub fn as_resolver(&self) -> Option<Resolver> {
        self.body.downcast_ref::<Resolver>().cloned()
    }
}

impl Member for FunctionMember {
    fn name(&self) -> &str {
        &self.name
    }

    fn declaring_type(&self) -> &TypeDescriptor {
        &self.declaring_type
    }

    fn is_static(&self) -> bool {
        self.is_static
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }
}

impl fmt::Debug for FunctionMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionMember")
            .field("name", &self.qualified_name())
            .field("is_static", &self.is_static)
            .field("visibility", &self.visibility)
            .field("signature", &self.signature)
            .finish()
    }
}
